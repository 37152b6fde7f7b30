/// Mock implementations for testing
mod mock_dependency_resolver;
mod mock_event_sink;
mod mock_inspection_runner;
mod mock_package_finder;
mod mock_result_cache;
mod mock_vulnerability_service;

#[allow(unused_imports)]
pub use mock_dependency_resolver::MockDependencyResolver;
#[allow(unused_imports)]
pub use mock_event_sink::RecordingEventSink;
#[allow(unused_imports)]
pub use mock_inspection_runner::RecordingInspectionRunner;
#[allow(unused_imports)]
pub use mock_package_finder::MockPackageFinder;
#[allow(unused_imports)]
pub use mock_result_cache::InMemoryResultCache;
#[allow(unused_imports)]
pub use mock_vulnerability_service::MockVulnerabilityService;
