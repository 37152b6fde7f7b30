/// End-to-end tests for the CLI
///
/// The workspaces used here contain no manifests, so a configured scan
/// completes without contacting the vulnerability service.
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with a private cache directory and no inherited service settings
fn scan_cmd(cache: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("workspace-scan");
    cmd.env_remove("WORKSPACE_SCAN_URL")
        .env_remove("WORKSPACE_SCAN_USER")
        .env_remove("WORKSPACE_SCAN_PASSWORD")
        .env_remove("WORKSPACE_SCAN_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--cache-dir")
        .arg(cache.path());
    cmd
}

/// Same as [`scan_cmd`], pointed at an unused local service
fn configured_cmd(cache: &TempDir) -> Command {
    let mut cmd = scan_cmd(cache);
    cmd.args(["--url", "http://127.0.0.1:9/xray", "--token", "test-token"]);
    cmd
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("workspace-scan")
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("--fail-on"));
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("workspace-scan")
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    /// Exit code 0: configured scan of a workspace without manifests
    #[test]
    fn test_exit_code_success() {
        let workspace = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        configured_cmd(&cache)
            .arg("-p")
            .arg(workspace.path())
            .assert()
            .code(0);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("workspace-scan")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid format value
    #[test]
    fn test_exit_code_invalid_format() {
        cargo_bin_cmd!("workspace-scan")
            .args(["-f", "invalid_format"])
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid severity value
    #[test]
    fn test_exit_code_invalid_severity() {
        cargo_bin_cmd!("workspace-scan")
            .args(["--fail-on", "urgent"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid severity"));
    }

    /// Exit code 2: --verbose and --quiet are mutually exclusive
    #[test]
    fn test_exit_code_verbose_conflicts_with_quiet() {
        cargo_bin_cmd!("workspace-scan")
            .args(["-v", "-q"])
            .assert()
            .code(2);
    }

    /// Exit code 3: Application error - non-existent workspace path
    #[test]
    fn test_exit_code_application_error_nonexistent_path() {
        let cache = TempDir::new().unwrap();
        configured_cmd(&cache)
            .args(["-p", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("❌ An error occurred"));
    }

    /// Exit code 3: Application error - path is a file, not a directory
    #[test]
    fn test_exit_code_application_error_file_not_directory() {
        let cache = TempDir::new().unwrap();
        configured_cmd(&cache)
            .args(["-p", "Cargo.toml"])
            .assert()
            .code(3);
    }

    /// Exit code 3: no server URL or credentials
    #[test]
    fn test_exit_code_not_configured() {
        let workspace = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        scan_cmd(&cache)
            .arg("-p")
            .arg(workspace.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Vulnerability service is not configured"))
            .stderr(predicate::str::contains("WORKSPACE_SCAN_URL"));
    }

    /// Exit code 3: URL given without credentials
    #[test]
    fn test_exit_code_url_without_credentials() {
        let workspace = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        scan_cmd(&cache)
            .args(["--url", "http://127.0.0.1:9/xray"])
            .arg("-p")
            .arg(workspace.path())
            .assert()
            .code(3);
    }

    /// Exit code 3: invalid exclude glob
    #[test]
    fn test_exit_code_invalid_exclude_pattern() {
        let workspace = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        configured_cmd(&cache)
            .arg("-p")
            .arg(workspace.path())
            .args(["-e", "**/{unclosed"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Unbalanced"));
    }
}

#[test]
fn test_e2e_json_report_of_empty_workspace() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    let output = configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .args(["-f", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tool"]["name"], "workspace-scan");
    assert_eq!(json["summary"]["modules"], 0);
    assert_eq!(json["summary"]["issues"], 0);
    assert!(json["modules"].as_array().unwrap().is_empty());
    assert!(json["issues"].as_array().unwrap().is_empty());
    assert!(json["generatedAt"].is_string());
}

#[test]
fn test_e2e_markdown_is_default_format() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("# Workspace Scan Report"))
        .stdout(predicate::str::contains("*No modules detected*"))
        .stderr(predicate::str::contains("📝 Generating Markdown report..."));
}

#[test]
fn test_e2e_quiet_suppresses_progress() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .arg("-q")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Generating").not());
}

#[test]
fn test_e2e_output_file() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let report = workspace.path().join("report.json");

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .args(["-f", "json", "-o"])
        .arg(&report)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["summary"]["components"], 0);
}

#[test]
fn test_e2e_fail_on_without_issues_succeeds() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .args(["--fail-on", "minimal"])
        .assert()
        .code(0);
}

#[test]
fn test_e2e_cache_directory_is_created() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .assert()
        .code(0);

    let projects = fs::read_dir(cache.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(projects, 1);
}

#[test]
fn test_e2e_save_filters_persists_selection() {
    let workspace = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let filters = cache.path().join("filters.json");

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .args(["--severity", "high", "--severity", "critical"])
        .assert()
        .code(0);
    assert!(!filters.exists());

    configured_cmd(&cache)
        .arg("-p")
        .arg(workspace.path())
        .args(["--severity", "high", "--severity", "critical", "--save-filters"])
        .assert()
        .code(0);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&filters).unwrap()).unwrap();
    assert_eq!(saved["severities"]["Low"], false);
    assert_eq!(saved["severities"]["High"], true);
}
