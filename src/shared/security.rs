use crate::shared::error::ScanError;
use crate::shared::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum size of a manifest read for module metadata (16 MB)
pub const MAX_MANIFEST_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum size of a configuration file (1 MB)
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Validates the workspace root and returns its canonical form
///
/// # Security
/// The root must not be a symbolic link. Manifests are discovered below it and
/// ecosystem tools are run inside it, so following a link would scan (and
/// execute build logic in) a directory the user did not name.
///
/// # Errors
/// Returns `ScanError::InvalidWorkspacePath` if the path does not exist, is a
/// symbolic link, or is not a directory.
pub fn validate_workspace_dir(path: &Path) -> std::result::Result<PathBuf, ScanError> {
    let invalid = |reason: String| ScanError::InvalidWorkspacePath {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = fs::symlink_metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            invalid("Directory does not exist".to_string())
        } else {
            invalid(format!("Failed to read path metadata: {}", e))
        }
    })?;

    if metadata.is_symlink() {
        return Err(invalid(
            "Security: Workspace path is a symbolic link. For security reasons, symbolic links are not allowed."
                .to_string(),
        ));
    }
    if !metadata.is_dir() {
        return Err(invalid("Not a directory".to_string()));
    }

    path.canonicalize()
        .map_err(|e| invalid(format!("Failed to canonicalize path: {}", e)))
}

/// Reads a regular file of at most `max_size` bytes
///
/// # Security
/// Symbolic links are rejected and the size is checked before reading, so a
/// hostile workspace cannot redirect or exhaust the reader.
///
/// # Arguments
/// * `path` - File to read
/// * `description` - Name used in error messages (e.g., "package.json")
/// * `max_size` - Upper bound in bytes
pub fn read_regular_file(path: &Path, description: &str, max_size: u64) -> Result<String> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to read {} metadata", description))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }
    if metadata.len() > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            metadata.len(),
            max_size
        );
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_workspace_dir_returns_canonical_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("ws")).unwrap();

        let dotted = temp_dir.path().join("ws").join("..").join("ws");
        let canonical = validate_workspace_dir(&dotted).unwrap();
        assert_eq!(canonical, temp_dir.path().join("ws").canonicalize().unwrap());
    }

    #[test]
    fn test_validate_workspace_dir_nonexistent() {
        let error = validate_workspace_dir(Path::new("/nonexistent/path/that/does/not/exist"))
            .unwrap_err();
        assert!(error.to_string().contains("Directory does not exist"));
    }

    #[test]
    fn test_validate_workspace_dir_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("package.json");
        fs::write(&file_path, "{}").unwrap();

        let error = validate_workspace_dir(&file_path).unwrap_err();
        assert!(matches!(error, ScanError::InvalidWorkspacePath { .. }));
        assert!(error.to_string().contains("Not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_workspace_dir_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real");
        fs::create_dir(&target).unwrap();
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let error = validate_workspace_dir(&link).unwrap_err();
        assert!(error.to_string().contains("symbolic link"));
    }

    #[test]
    fn test_read_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("go.mod");
        fs::write(&path, "module example.com/svc\n").unwrap();

        let content = read_regular_file(&path, "go.mod", MAX_MANIFEST_SIZE).unwrap();
        assert_eq!(content, "module example.com/svc\n");
    }

    #[test]
    fn test_read_regular_file_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let error = read_regular_file(temp_dir.path(), "go.mod", MAX_MANIFEST_SIZE).unwrap_err();
        assert!(error.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_read_regular_file_rejects_oversized_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");
        fs::write(&path, "x".repeat(65)).unwrap();

        let error = read_regular_file(&path, "package.json", 64).unwrap_err();
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn test_read_regular_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let error = read_regular_file(&temp_dir.path().join("pom.xml"), "pom.xml", MAX_MANIFEST_SIZE)
            .unwrap_err();
        assert!(error.to_string().contains("Failed to read pom.xml metadata"));
    }
}
