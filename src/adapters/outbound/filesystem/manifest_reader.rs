use crate::scan_engine::domain::Ecosystem;
use crate::shared::security::{read_regular_file, MAX_MANIFEST_SIZE};
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// ManifestReader reads module display names from ecosystem manifests
///
/// Names come from `package.json` (`name`), `go.mod` (`module`) and
/// `pyproject.toml` (`[project].name`, then `[tool.poetry].name`). Maven and
/// Gradle names are taken from the build tool output instead.
pub struct ManifestReader;

impl ManifestReader {
    /// Module name for `dir`, falling back to the directory name
    pub fn module_name(ecosystem: Ecosystem, dir: &Path) -> String {
        let found = match ecosystem {
            Ecosystem::Npm => Self::read(dir, "package.json").and_then(|c| Self::parse_package_json(&c)),
            Ecosystem::Go => Self::read(dir, "go.mod").and_then(|c| Self::parse_go_mod(&c)),
            Ecosystem::Pypi => Self::read(dir, "pyproject.toml").and_then(|c| Self::parse_pyproject(&c)),
            Ecosystem::Maven | Ecosystem::Gradle => Ok(None),
        };

        match found {
            Ok(Some(name)) => name,
            Ok(None) => Self::directory_name(dir),
            Err(e) => {
                debug!(path = %dir.display(), "Falling back to directory name: {:#}", e);
                Self::directory_name(dir)
            }
        }
    }

    pub fn directory_name(dir: &Path) -> String {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string())
    }

    /// Reads a manifest with the regular-file and size checks applied
    pub fn read(dir: &Path, file_name: &str) -> Result<String> {
        read_regular_file(&dir.join(file_name), file_name, MAX_MANIFEST_SIZE)
    }

    fn parse_package_json(content: &str) -> Result<Option<String>> {
        let value: serde_json::Value =
            serde_json::from_str(content).context("Failed to parse package.json")?;
        Ok(value
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string))
    }

    fn parse_go_mod(content: &str) -> Result<Option<String>> {
        Ok(content.lines().find_map(|line| {
            let rest = line.trim().strip_prefix("module")?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let name = rest.trim().trim_matches('"');
            (!name.is_empty()).then(|| name.to_string())
        }))
    }

    fn parse_pyproject(content: &str) -> Result<Option<String>> {
        let value: toml::Value = toml::from_str(content).context("Failed to parse pyproject.toml")?;
        let name = value
            .get("project")
            .and_then(|p| p.get("name"))
            .or_else(|| {
                value
                    .get("tool")
                    .and_then(|t| t.get("poetry"))
                    .and_then(|p| p.get("name"))
            })
            .and_then(|n| n.as_str())
            .map(str::to_string);
        Ok(name)
    }
}
