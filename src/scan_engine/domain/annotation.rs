use super::{ComponentId, Issue, License};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scan findings for one component as returned by the vulnerability service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAnnotation {
    component: ComponentId,
    issues: Vec<Issue>,
    licenses: Vec<License>,
}

impl ComponentAnnotation {
    pub fn new(component: ComponentId, issues: Vec<Issue>, licenses: Vec<License>) -> Self {
        Self {
            component,
            issues,
            licenses,
        }
    }

    /// Annotation for a component the service knows nothing bad about
    pub fn clean(component: ComponentId) -> Self {
        Self::new(component, Vec::new(), Vec::new())
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }
}

/// Cache record: the last annotation seen for a component plus when it was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAnnotation {
    pub annotation: ComponentAnnotation,
    pub scanned_at: DateTime<Utc>,
}

impl CachedAnnotation {
    pub fn new(annotation: ComponentAnnotation) -> Self {
        Self {
            annotation,
            scanned_at: Utc::now(),
        }
    }
}
