//! Configuration file support for workspace-scan.
//!
//! Provides YAML-based configuration through `workspace-scan.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::scan_engine::domain::Severity;
use crate::shared::security::{read_regular_file, MAX_CONFIG_SIZE};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "workspace-scan.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Base URL of the vulnerability service
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    /// Glob patterns of directories never searched for manifests
    pub excluded_paths: Option<Vec<String>>,
    pub cache_dir: Option<PathBuf>,
    /// Service request timeout in seconds
    pub connection_timeout: Option<u64>,
    /// Time limit for one ecosystem tool run in seconds
    pub resolver_timeout: Option<u64>,
    pub fail_on: Option<String>,
    pub format: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// `fail_on` as a severity; validated on load
    pub fn fail_on_severity(&self) -> Option<Severity> {
        self.fail_on.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = read_regular_file(path, CONFIG_FILENAME, MAX_CONFIG_SIZE).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(ref url) = config.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "Invalid config: url '{}' must start with http:// or https://.\n\n\
                 💡 Hint: Use the full server URL (e.g., \"https://acme.jfrog.io/xray\").",
                url
            );
        }
    }

    if config.username.is_some() != config.password.is_some() {
        bail!(
            "Invalid config: username and password must be given together.\n\n\
             💡 Hint: Set both fields, or use access_token instead."
        );
    }

    for (field, value) in [
        ("connection_timeout", config.connection_timeout),
        ("resolver_timeout", config.resolver_timeout),
    ] {
        if value == Some(0) {
            bail!(
                "Invalid config: {} must be greater than 0.\n\n\
                 💡 Hint: The value is a number of seconds.",
                field
            );
        }
    }

    if let Some(ref fail_on) = config.fail_on {
        if fail_on.parse::<Severity>().is_err() {
            bail!(
                "Invalid config: fail_on '{}' is not a severity.\n\n\
                 💡 Hint: Use one of minimal, low, medium, high, critical.",
                fail_on
            );
        }
    }

    if let Some(ref patterns) = config.excluded_paths {
        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                bail!(
                    "Invalid config: excluded_paths[{}] must not be empty.\n\n\
                     💡 Hint: Each entry is a glob such as \"**/test/**\".",
                    i
                );
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        warn!("Unknown config field '{}' will be ignored.", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            r#"
url: https://acme.jfrog.io/xray
username: admin
password: secret
excluded_paths:
  - "**/test/**"
  - "**/.idea/**"
cache_dir: /tmp/workspace-scan
connection_timeout: 30
resolver_timeout: 300
fail_on: high
format: json
"#,
        );

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.url.as_deref(), Some("https://acme.jfrog.io/xray"));
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(
            config.excluded_paths.as_deref(),
            Some(&["**/test/**".to_string(), "**/.idea/**".to_string()][..])
        );
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/workspace-scan")));
        assert_eq!(config.connection_timeout, Some(30));
        assert_eq!(config.resolver_timeout, Some(300));
        assert_eq!(config.fail_on_severity(), Some(Severity::High));
        assert_eq!(config.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "access_token: abc\nurl: http://localhost:8000\n",
        )
        .unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "invalid: yaml: [[[broken");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "url: ftp://acme\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("must start with http:// or https://"));
    }

    #[test]
    fn test_username_without_password() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "username: admin\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("username and password must be given together"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "connection_timeout: 0\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("connection_timeout must be greater than 0"));
    }

    #[test]
    fn test_invalid_fail_on() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "fail_on: catastrophic\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("is not a severity"));
    }

    #[test]
    fn test_empty_excluded_path_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "excluded_paths:\n  - \"  \"\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("excluded_paths[0] must not be empty"));
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "format: json\nunknown_field: true\nanother_unknown: value\n");

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("unknown_field"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.url.is_none());
        assert!(config.excluded_paths.is_none());
        assert!(config.fail_on_severity().is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
