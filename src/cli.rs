use clap::Parser;
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::scan_engine::domain::{FilterSelection, Scope, Severity};

/// Scan a multi-ecosystem workspace for vulnerable dependencies
#[derive(Parser, Debug)]
#[command(name = "workspace-scan")]
#[command(version)]
#[command(
    about = "Scan Maven, Gradle, npm, Go and Python modules of a workspace for vulnerabilities and licenses",
    long_about = None
)]
pub struct Args {
    /// Path to the workspace directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Path to a config file (defaults to workspace-scan.config.yml in the workspace)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: markdown or json
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ignore cached results and query the server for every component
    #[arg(long)]
    pub full: bool,

    /// Vulnerability service URL
    #[arg(long, env = "WORKSPACE_SCAN_URL")]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "WORKSPACE_SCAN_USER")]
    pub user: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "WORKSPACE_SCAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Access token, used instead of username and password
    #[arg(long, env = "WORKSPACE_SCAN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Show only issues of these severities.
    /// Can be specified multiple times: --severity high --severity critical
    #[arg(long = "severity", value_name = "SEVERITY")]
    pub severities: Vec<Severity>,

    /// Hide components under this license. Can be specified multiple times
    #[arg(long = "exclude-license", value_name = "LICENSE")]
    pub exclude_licenses: Vec<String>,

    /// Hide components of this scope (e.g. test, dev). Can be specified multiple times
    #[arg(long = "exclude-scope", value_name = "SCOPE")]
    pub exclude_scopes: Vec<String>,

    /// Additional directories never searched for manifests (glob, e.g. "**/fixtures/**")
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Result cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Exit with code 1 when an issue of this severity or higher is reported
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,

    /// Persist the filter selection of this run for the next runs
    #[arg(long)]
    pub save_filters: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Applies the severity, license and scope flags on top of `selection`
    pub fn apply_filters(&self, selection: &mut FilterSelection) {
        if !self.severities.is_empty() {
            for severity in Severity::ALL {
                selection.set_severity(severity, self.severities.contains(&severity));
            }
        }
        for license in &self.exclude_licenses {
            selection.set_license(license, false);
        }
        for scope in &self.exclude_scopes {
            selection.set_scope(Scope::new(scope.as_str()).name(), false);
        }
    }
}
