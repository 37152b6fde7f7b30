//! Read models for CQRS-lite pattern
//!
//! This module contains view-optimized structs that provide
//! a denormalized representation of scan results for formatters.

mod scan_report;
mod scan_report_builder;

pub use scan_report::{
    IssueView, LicenseView, ModuleView, NodeView, ReportMetadataView, ScanReport, SummaryView,
};
pub use scan_report_builder::{ScanReportBuilder, TreeSource};
