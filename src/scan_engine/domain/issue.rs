use super::ComponentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Minimal,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Parses a severity name as reported by the vulnerability service.
    ///
    /// Unknown, informational and empty values map to `Minimal`.
    pub fn parse_lenient(value: &str) -> Severity {
        match value.trim().to_uppercase().as_str() {
            "CRITICAL" => Severity::Critical,
            "HIGH" | "MAJOR" => Severity::High,
            "MEDIUM" | "MODERATE" => Severity::Medium,
            "LOW" | "MINOR" => Severity::Low,
            _ => Severity::Minimal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(Severity::Minimal),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Invalid severity: {}. Expected one of: minimal, low, medium, high, critical",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Security,
    License,
    Other,
}

impl IssueKind {
    pub fn parse_lenient(value: &str) -> IssueKind {
        match value.trim().to_lowercase().as_str() {
            "security" | "vulnerability" => IssueKind::Security,
            "license" => IssueKind::License,
            _ => IssueKind::Other,
        }
    }
}

/// Identity used for set semantics: (summary, affected component)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IssueKey {
    pub summary: String,
    pub component: ComponentId,
}

/// A finding reported by the vulnerability service for one component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    id: Option<String>,
    severity: Severity,
    kind: IssueKind,
    summary: String,
    component: ComponentId,
    fixed_versions: Vec<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        summary: impl Into<String>,
        component: ComponentId,
    ) -> Self {
        Self {
            id: None,
            severity,
            kind,
            summary: summary.into(),
            component,
            fixed_versions: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_fixed_versions(mut self, fixed_versions: Vec<String>) -> Self {
        self.fixed_versions = fixed_versions;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn fixed_versions(&self) -> &[String] {
        &self.fixed_versions
    }

    pub fn key(&self) -> IssueKey {
        IssueKey {
            summary: self.summary.clone(),
            component: self.component.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_engine::domain::Ecosystem;
    use std::str::FromStr;

    fn component() -> ComponentId {
        ComponentId::unscoped(Ecosystem::Npm, "minimist", "1.2.0").unwrap()
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Minimal < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_severity_parse_lenient() {
        assert_eq!(Severity::parse_lenient("Critical"), Severity::Critical);
        assert_eq!(Severity::parse_lenient("high"), Severity::High);
        assert_eq!(Severity::parse_lenient("Major"), Severity::High);
        assert_eq!(Severity::parse_lenient("MODERATE"), Severity::Medium);
        assert_eq!(Severity::parse_lenient("Minor"), Severity::Low);
        assert_eq!(Severity::parse_lenient("Information"), Severity::Minimal);
        assert_eq!(Severity::parse_lenient("Unknown"), Severity::Minimal);
        assert_eq!(Severity::parse_lenient(""), Severity::Minimal);
    }

    #[test]
    fn test_severity_from_str_strict() {
        assert_eq!(Severity::from_str("HIGH").unwrap(), Severity::High);
        let err = Severity::from_str("severe").unwrap_err();
        assert!(err.contains("Invalid severity"));
    }

    #[test]
    fn test_issue_kind_parse() {
        assert_eq!(IssueKind::parse_lenient("security"), IssueKind::Security);
        assert_eq!(IssueKind::parse_lenient("License"), IssueKind::License);
        assert_eq!(IssueKind::parse_lenient("operational_risk"), IssueKind::Other);
    }

    #[test]
    fn test_issue_key_ignores_severity() {
        let a = Issue::new(Severity::High, IssueKind::Security, "Prototype pollution", component());
        let b = Issue::new(Severity::Low, IssueKind::Security, "Prototype pollution", component())
            .with_id("XRAY-1");
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_issue_builders() {
        let issue = Issue::new(Severity::Medium, IssueKind::Security, "ReDoS", component())
            .with_id("CVE-2021-44906")
            .with_fixed_versions(vec!["1.2.6".to_string()]);
        assert_eq!(issue.id(), Some("CVE-2021-44906"));
        assert_eq!(issue.fixed_versions(), &["1.2.6".to_string()]);
        assert_eq!(issue.component(), &component());
    }
}
