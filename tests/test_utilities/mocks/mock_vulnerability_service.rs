use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use workspace_scan::shared::error::ServiceError;
use workspace_scan::prelude::*;

/// Mock VulnerabilityService with canned findings and a call counter
///
/// A gated service parks every `scan` call until [`release`](Self::release)
/// is called, which keeps a scan in flight for as long as a test needs.
pub struct MockVulnerabilityService {
    annotations: Mutex<HashMap<ComponentId, ComponentAnnotation>>,
    should_fail: AtomicBool,
    gate: Option<Notify>,
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<ComponentId>>>,
}

impl MockVulnerabilityService {
    pub fn new() -> Self {
        Self {
            annotations: Mutex::new(HashMap::new()),
            should_fail: AtomicBool::new(false),
            gate: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new()
        }
    }

    pub fn with_issue(self, component: &ComponentId, severity: Severity, summary: &str) -> Self {
        let mut annotations = self.annotations.lock().unwrap();
        let entry = annotations
            .entry(component.clone())
            .or_insert_with(|| ComponentAnnotation::clean(component.clone()));
        let mut issues = entry.issues().to_vec();
        issues.push(Issue::new(severity, IssueKind::Security, summary, component.clone()));
        *entry = ComponentAnnotation::new(component.clone(), issues, entry.licenses().to_vec());
        drop(annotations);
        self
    }

    pub fn with_license(self, component: &ComponentId, license: &str) -> Self {
        let mut annotations = self.annotations.lock().unwrap();
        let entry = annotations
            .entry(component.clone())
            .or_insert_with(|| ComponentAnnotation::clean(component.clone()));
        let mut licenses = entry.licenses().to_vec();
        licenses.push(License::new(license));
        *entry = ComponentAnnotation::new(component.clone(), entry.issues().to_vec(), licenses);
        drop(annotations);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    /// Lets one parked (or the next) `scan` call proceed
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Vec<ComponentId>> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockVulnerabilityService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VulnerabilityService for MockVulnerabilityService {
    async fn check_compatibility(&self) -> std::result::Result<(), ServiceError> {
        Ok(())
    }

    async fn scan(
        &self,
        components: &[ComponentId],
    ) -> std::result::Result<Vec<ComponentAnnotation>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(components.to_vec());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Connection {
                url: "http://mock".to_string(),
                details: "connection refused".to_string(),
            });
        }

        let annotations = self.annotations.lock().unwrap();
        Ok(components
            .iter()
            .filter_map(|c| annotations.get(c).cloned())
            .collect())
    }
}
