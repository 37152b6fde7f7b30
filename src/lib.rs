//! workspace-scan - multi-ecosystem workspace dependency scanner
//!
//! This library detects the Maven, Gradle, npm, Go and Python modules of a
//! workspace, builds one dependency tree per module from the ecosystem's own
//! tooling, annotates the trees with the vulnerability and license findings
//! of an Xray-compatible service and answers filtered queries over them.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`scan_engine`): Dependency tree, filter selection and
//!   the pure filter and tree-building services
//! - **Application Layer** (`application`): Scan managers, the registry that
//!   owns them, queries, read models and use cases
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use workspace_scan::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<()> {
//! let workspace = Path::new(".");
//! let service = XrayClient::new(
//!     "https://acme.jfrog.io/xray",
//!     XrayCredentials::AccessToken("token".to_string()),
//!     Duration::from_secs(60),
//! )?;
//!
//! let mut builder = ScanContext::builder(
//!     Arc::new(FileSystemPackageFinder::new()),
//!     Arc::new(FileSystemResultCache::new(Path::new("/tmp/workspace-scan"), "my-workspace")),
//!     Arc::new(BroadcastEventSink::new()),
//! )
//! .service(Arc::new(service));
//! for resolver in ResolverFactory::create_all(Duration::from_secs(600)) {
//!     builder = builder.resolver(resolver);
//! }
//!
//! let registry = Arc::new(ScanManagerRegistry::new(workspace, builder.build())?);
//! let response = ScanWorkspaceUseCase::new(registry)
//!     .execute(ScanRequest::default())
//!     .await?;
//!
//! let output = MarkdownFormatter::new().format(&response.report)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod scan_engine;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::events::BroadcastEventSink;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemFilterStateStore, FileSystemPackageFinder, FileSystemResultCache,
        FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, MarkdownFormatter};
    pub use crate::adapters::outbound::network::{XrayClient, XrayCredentials};
    pub use crate::application::dto::{OutputFormat, ScanRequest, ScanResponse};
    pub use crate::application::factories::{FormatterFactory, ResolverFactory};
    pub use crate::application::queries::{NodeRef, ScanResultsQuery};
    pub use crate::application::read_models::{ScanReport, ScanReportBuilder};
    pub use crate::application::scan::{
        EcosystemScanManager, ManagerKey, ScanContext, ScanManagerRegistry, ScanRun,
        StartScanOutcome,
    };
    pub use crate::application::use_cases::ScanWorkspaceUseCase;
    pub use crate::ports::outbound::{
        DependencyResolver, EventSink, FilterStateStore, InspectionRunner, OutputPresenter,
        PackageFinder, ReportFormatter, ResultCache, ScanEvent, VulnerabilityService,
    };
    pub use crate::scan_engine::domain::{
        ComponentAnnotation, ComponentId, DependencyGraph, DependencyTree, Ecosystem,
        FilterSelection, GeneralInfo, Issue, IssueKind, License, NodeId, ResolvedModule, Scope,
        Severity,
    };
    pub use crate::scan_engine::services::{ExcludeFilter, FilterEngine};
    pub use crate::shared::Result;
}
