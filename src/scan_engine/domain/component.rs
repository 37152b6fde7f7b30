use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum length for a single identity field (security limit)
const MAX_FIELD_LENGTH: usize = 512;

/// Package-management system a component belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Maven,
    Gradle,
    Npm,
    Go,
    Pypi,
}

impl Ecosystem {
    /// All ecosystems, in registry discovery order
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::Maven,
        Ecosystem::Npm,
        Ecosystem::Gradle,
        Ecosystem::Go,
        Ecosystem::Pypi,
    ];

    /// Component id prefix understood by the vulnerability service.
    ///
    /// Maven and Gradle share the `gav` namespace since both resolve
    /// artifacts from Maven repositories.
    pub fn component_prefix(&self) -> &'static str {
        match self {
            Ecosystem::Maven | Ecosystem::Gradle => "gav",
            Ecosystem::Npm => "npm",
            Ecosystem::Go => "go",
            Ecosystem::Pypi => "pypi",
        }
    }

    /// Whether identities carry a group distinct from the artifact name
    pub fn has_namespace(&self) -> bool {
        matches!(self, Ecosystem::Maven | Ecosystem::Gradle)
    }

    /// Manifest file names that mark a module directory of this ecosystem
    pub fn manifest_files(&self) -> &'static [&'static str] {
        match self {
            Ecosystem::Maven => &["pom.xml"],
            Ecosystem::Gradle => &["build.gradle", "build.gradle.kts"],
            Ecosystem::Npm => &["package.json"],
            Ecosystem::Go => &["go.mod"],
            Ecosystem::Pypi => &["pyproject.toml", "setup.py", "requirements.txt"],
        }
    }

    /// Ecosystem owning a manifest file name, if any
    pub fn from_manifest(file_name: &str) -> Option<Ecosystem> {
        Ecosystem::ALL
            .into_iter()
            .find(|e| e.manifest_files().contains(&file_name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Maven => "maven",
            Ecosystem::Gradle => "gradle",
            Ecosystem::Npm => "npm",
            Ecosystem::Go => "go",
            Ecosystem::Pypi => "pypi",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "maven" | "mvn" => Ok(Ecosystem::Maven),
            "gradle" => Ok(Ecosystem::Gradle),
            "npm" | "node" => Ok(Ecosystem::Npm),
            "go" | "golang" => Ok(Ecosystem::Go),
            "pypi" | "python" | "pip" => Ok(Ecosystem::Pypi),
            _ => Err(format!("Unknown ecosystem: {}", s)),
        }
    }
}

/// Component identity: (ecosystem, namespace, artifact, version)
///
/// Used both as the label of a dependency tree node and as the result cache
/// key. Ordering is lexicographic over the tuple, which keeps flattened
/// component sets deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    ecosystem: Ecosystem,
    namespace: String,
    artifact: String,
    version: String,
}

impl ComponentId {
    pub fn new(
        ecosystem: Ecosystem,
        namespace: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        let artifact = artifact.into();
        let version = version.into();

        if artifact.trim().is_empty() {
            anyhow::bail!("Component artifact name cannot be empty");
        }
        for (field, value) in [
            ("namespace", &namespace),
            ("artifact", &artifact),
            ("version", &version),
        ] {
            if value.len() > MAX_FIELD_LENGTH {
                anyhow::bail!(
                    "Component {} is too long ({} bytes). Maximum allowed: {} bytes",
                    field,
                    value.len(),
                    MAX_FIELD_LENGTH
                );
            }
            if value.chars().any(|c| c.is_control()) {
                anyhow::bail!("Component {} contains control characters", field);
            }
        }

        Ok(Self {
            ecosystem,
            namespace,
            artifact,
            version,
        })
    }

    /// Identity for ecosystems without a separate namespace (npm, PyPI).
    pub fn unscoped(
        ecosystem: Ecosystem,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let artifact = artifact.into();
        Self::new(ecosystem, artifact.clone(), artifact, version)
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `<prefix>://<coordinates>` as submitted to the vulnerability service
    pub fn to_component_string(&self) -> String {
        format!("{}://{}", self.ecosystem.component_prefix(), self.coordinates())
    }

    /// Coordinates without the ecosystem prefix
    ///
    /// Maven and Gradle always keep the group, even when it repeats the
    /// artifact name (`junit:junit:4.12`).
    pub fn coordinates(&self) -> String {
        let collapse = self.namespace.is_empty()
            || (!self.ecosystem.has_namespace() && self.namespace == self.artifact);
        if collapse {
            format!("{}:{}", self.artifact, self.version)
        } else {
            format!("{}:{}:{}", self.namespace, self.artifact, self.version)
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinates())
    }
}

/// Dependency scope (compile, runtime, test, dev, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Component descriptor carried by every dependency tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneralInfo {
    id: ComponentId,
    path: Option<PathBuf>,
    scope: Option<Scope>,
}

impl GeneralInfo {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            path: None,
            scope: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }
}
