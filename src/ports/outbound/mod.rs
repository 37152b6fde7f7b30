/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the scan engine uses
/// to interact with external systems (file system, ecosystem tooling,
/// network, UI notifications).
pub mod dependency_resolver;
pub mod event_sink;
pub mod filter_state_store;
pub mod formatter;
pub mod inspection_runner;
pub mod output_presenter;
pub mod package_finder;
pub mod result_cache;
pub mod vulnerability_service;

pub use dependency_resolver::DependencyResolver;
pub use event_sink::{EventSink, ScanEvent};
pub use filter_state_store::FilterStateStore;
pub use formatter::ReportFormatter;
pub use inspection_runner::InspectionRunner;
pub use output_presenter::OutputPresenter;
pub use package_finder::{PackageDirs, PackageFinder};
pub use result_cache::ResultCache;
pub use vulnerability_service::VulnerabilityService;
