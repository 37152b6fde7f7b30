use crate::ports::outbound::{
    DependencyResolver, EventSink, InspectionRunner, PackageFinder, ResultCache, ScanEvent,
    VulnerabilityService,
};
use crate::scan_engine::domain::Ecosystem;
use crate::scan_engine::services::ExcludeFilter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Collaborators shared by a registry and every scan manager it creates.
///
/// The embedding application builds one context per workspace session and
/// hands it to [`ScanManagerRegistry::new`](super::ScanManagerRegistry::new).
pub struct ScanContext {
    finder: Arc<dyn PackageFinder>,
    resolvers: HashMap<Ecosystem, Arc<dyn DependencyResolver>>,
    service: Option<Arc<dyn VulnerabilityService>>,
    cache: Arc<dyn ResultCache>,
    events: Arc<dyn EventSink>,
    inspections: Option<Arc<dyn InspectionRunner>>,
    exclude: ExcludeFilter,
    cancellation: CancellationToken,
}

impl ScanContext {
    pub fn builder(
        finder: Arc<dyn PackageFinder>,
        cache: Arc<dyn ResultCache>,
        events: Arc<dyn EventSink>,
    ) -> ScanContextBuilder {
        ScanContextBuilder {
            context: ScanContext {
                finder,
                resolvers: HashMap::new(),
                service: None,
                cache,
                events,
                inspections: None,
                exclude: ExcludeFilter::with_defaults(),
                cancellation: CancellationToken::new(),
            },
        }
    }

    pub fn finder(&self) -> &dyn PackageFinder {
        self.finder.as_ref()
    }

    pub fn resolver(&self, ecosystem: Ecosystem) -> Option<&Arc<dyn DependencyResolver>> {
        self.resolvers.get(&ecosystem)
    }

    /// `None` when no server or credentials are configured
    pub fn service(&self) -> Option<&Arc<dyn VulnerabilityService>> {
        self.service.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn cache(&self) -> &dyn ResultCache {
        self.cache.as_ref()
    }

    pub fn inspections(&self) -> Option<&Arc<dyn InspectionRunner>> {
        self.inspections.as_ref()
    }

    pub fn exclude(&self) -> &ExcludeFilter {
        &self.exclude
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn emit(&self, event: ScanEvent) {
        trace!(%event, "Emitting scan event");
        self.events.emit(event);
    }
}

pub struct ScanContextBuilder {
    context: ScanContext,
}

impl ScanContextBuilder {
    /// Registers the resolver for the ecosystem it reports
    pub fn resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.context.resolvers.insert(resolver.ecosystem(), resolver);
        self
    }

    pub fn service(mut self, service: Arc<dyn VulnerabilityService>) -> Self {
        self.context.service = Some(service);
        self
    }

    pub fn inspections(mut self, runner: Arc<dyn InspectionRunner>) -> Self {
        self.context.inspections = Some(runner);
        self
    }

    pub fn exclude(mut self, exclude: ExcludeFilter) -> Self {
        self.context.exclude = exclude;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.context.cancellation = token;
        self
    }

    pub fn build(self) -> ScanContext {
        self.context
    }
}
