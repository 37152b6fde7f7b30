use crate::ports::outbound::VulnerabilityService;
use crate::scan_engine::domain::{
    ComponentAnnotation, ComponentId, Issue, IssueKind, License, Severity,
};
use crate::shared::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, info};

/// Oldest server version exposing the component summary API
pub const MINIMUM_XRAY_VERSION: &str = "1.7.2";

/// Credentials sent with every request
#[derive(Clone)]
pub enum XrayCredentials {
    Basic { username: String, password: String },
    AccessToken(String),
}

impl std::fmt::Debug for XrayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XrayCredentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            XrayCredentials::AccessToken(_) => f.write_str("AccessToken(***)"),
        }
    }
}

/// Xray client for the component summary API
///
/// # Security
/// - Implements timeout (60 seconds by default)
/// - Credentials are never logged
/// - Does not retry failed requests; a failed scan falls back to cached results
pub struct XrayClient {
    client: Client,
    base_url: String,
    credentials: XrayCredentials,
}

impl XrayClient {
    const VERSION_ENDPOINT: &'static str = "api/v1/system/version";
    const SUMMARY_ENDPOINT: &'static str = "api/v1/summary/component";
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
    const MAX_BATCH_SIZE: usize = 100;

    /// Creates a new client for the server at `url`
    ///
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built
    pub fn new(
        url: &str,
        credentials: XrayCredentials,
        timeout: Duration,
    ) -> crate::shared::Result<Self> {
        let base_url = url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            anyhow::bail!(
                "Invalid server URL '{}': expected an http:// or https:// URL",
                url
            );
        }

        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            XrayCredentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            XrayCredentials::AccessToken(token) => request.bearer_auth(token),
        }
    }

    async fn send(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> std::result::Result<Response, ServiceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ServiceError::Connection {
                url: url.to_string(),
                details: e.to_string(),
            })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Authentication {
                url: url.to_string(),
                status: response.status().as_u16(),
            }),
            status => Err(ServiceError::InvalidResponse {
                url: url.to_string(),
                details: format!("server returned status code {}", status),
            }),
        }
    }

    async fn fetch_batch(
        &self,
        components: &[ComponentId],
    ) -> std::result::Result<Vec<ComponentAnnotation>, ServiceError> {
        let url = self.endpoint(Self::SUMMARY_ENDPOINT);
        let body = SummaryRequest {
            component_details: components
                .iter()
                .map(|c| ComponentDetail {
                    component_id: c.to_component_string(),
                })
                .collect(),
        };

        let response = self.send(&url, self.client.post(&url).json(&body)).await?;
        let summary: SummaryResponse =
            response
                .json()
                .await
                .map_err(|e| ServiceError::InvalidResponse {
                    url: url.clone(),
                    details: e.to_string(),
                })?;

        Ok(convert_summary(components, summary))
    }
}

#[async_trait]
impl VulnerabilityService for XrayClient {
    async fn check_compatibility(&self) -> std::result::Result<(), ServiceError> {
        let url = self.endpoint(Self::VERSION_ENDPOINT);
        let response = self.send(&url, self.client.get(&url)).await?;
        let version: VersionResponse =
            response
                .json()
                .await
                .map_err(|e| ServiceError::InvalidResponse {
                    url: url.clone(),
                    details: e.to_string(),
                })?;

        if !is_supported_version(&version.xray_version) {
            return Err(ServiceError::UnsupportedVersion {
                found: version.xray_version,
                required: MINIMUM_XRAY_VERSION.to_string(),
            });
        }
        debug!(version = %version.xray_version, "Server version accepted");
        Ok(())
    }

    async fn scan(
        &self,
        components: &[ComponentId],
    ) -> std::result::Result<Vec<ComponentAnnotation>, ServiceError> {
        let total_batches = components.len().div_ceil(Self::MAX_BATCH_SIZE);
        let mut annotations = Vec::with_capacity(components.len());

        for (index, batch) in components.chunks(Self::MAX_BATCH_SIZE).enumerate() {
            debug!(
                batch = index + 1,
                total_batches,
                size = batch.len(),
                "Requesting component summary"
            );
            annotations.extend(self.fetch_batch(batch).await?);
        }

        info!(
            components = components.len(),
            annotated = annotations.len(),
            "Component summary received"
        );
        Ok(annotations)
    }
}

/// A leading `v` is ignored and two-part versions such as `1.10` are padded
fn is_supported_version(found: &str) -> bool {
    match (parse_version(found), Version::parse(MINIMUM_XRAY_VERSION)) {
        (Some(found), Ok(minimum)) => found >= minimum,
        _ => false,
    }
}

fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim().trim_start_matches('v');
    if let Ok(parsed) = Version::parse(version) {
        return Some(parsed);
    }

    let (core, suffix) = version.split_at(version.find(['-', '+']).unwrap_or(version.len()));
    let padded = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, suffix),
        2 => format!("{}.0{}", core, suffix),
        _ => return None,
    };
    Version::parse(&padded).ok()
}

/// Maps the service response back onto the requested identities.
///
/// Artifacts the response names but that were not requested are dropped.
fn convert_summary(requested: &[ComponentId], summary: SummaryResponse) -> Vec<ComponentAnnotation> {
    let by_id: HashMap<String, &ComponentId> = requested
        .iter()
        .map(|c| (c.to_component_string().to_lowercase(), c))
        .collect();

    summary
        .artifacts
        .into_iter()
        .filter_map(|artifact| {
            let key = artifact.general.component_id.to_lowercase();
            let Some(component) = by_id.get(&key) else {
                debug!(component_id = %artifact.general.component_id, "Ignoring unrequested artifact");
                return None;
            };
            Some(convert_artifact(component, &key, artifact))
        })
        .collect()
}

fn convert_artifact(component: &ComponentId, key: &str, artifact: Artifact) -> ComponentAnnotation {
    let issues = artifact
        .issues
        .into_iter()
        .map(|issue| {
            let fixed_versions: BTreeSet<String> = issue
                .components
                .iter()
                .filter(|c| c.component_id.to_lowercase() == key)
                .flat_map(|c| c.fixed_versions.iter().cloned())
                .collect();
            let id = issue
                .cves
                .iter()
                .find_map(|c| c.cve.clone().filter(|cve| !cve.is_empty()))
                .or(issue.issue_id);
            let summary = if issue.summary.trim().is_empty() {
                issue.description.unwrap_or_default()
            } else {
                issue.summary
            };

            let mut converted = Issue::new(
                Severity::parse_lenient(&issue.severity),
                IssueKind::parse_lenient(&issue.issue_type),
                summary,
                component.clone(),
            )
            .with_fixed_versions(fixed_versions.into_iter().collect());
            if let Some(id) = id {
                converted = converted.with_id(id);
            }
            converted
        })
        .collect();

    let licenses = artifact
        .licenses
        .into_iter()
        .filter(|l| !l.name.trim().is_empty())
        .map(|l| {
            let mut license = License::new(l.name);
            if let Some(full_name) = l.full_name.filter(|n| !n.is_empty()) {
                license = license.with_full_name(full_name);
            }
            if let Some(url) = l.more_info_url.into_iter().next() {
                license = license.with_url(url);
            }
            license
        })
        .collect();

    ComponentAnnotation::new(component.clone(), issues, licenses)
}

#[derive(Debug, Serialize)]
struct SummaryRequest {
    component_details: Vec<ComponentDetail>,
}

#[derive(Debug, Serialize)]
struct ComponentDetail {
    component_id: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    xray_version: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    general: General,
    #[serde(default)]
    issues: Vec<XrayIssue>,
    #[serde(default)]
    licenses: Vec<XrayLicense>,
}

#[derive(Debug, Deserialize)]
struct General {
    component_id: String,
}

#[derive(Debug, Deserialize)]
struct XrayIssue {
    #[serde(default)]
    issue_id: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    issue_type: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    components: Vec<AffectedComponent>,
    #[serde(default)]
    cves: Vec<XrayCve>,
}

#[derive(Debug, Deserialize)]
struct AffectedComponent {
    component_id: String,
    #[serde(default)]
    fixed_versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct XrayCve {
    #[serde(default)]
    cve: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XrayLicense {
    name: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    more_info_url: Vec<String>,
}
