use directories::ProjectDirs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use workspace_scan::adapters::outbound::console::ScanSpinner;
use workspace_scan::adapters::outbound::events::BroadcastEventSink;
use workspace_scan::adapters::outbound::filesystem::{
    FileSystemFilterStateStore, FileSystemPackageFinder, FileSystemResultCache, FILTERS_FILE_NAME,
};
use workspace_scan::adapters::outbound::network::{XrayClient, XrayCredentials};
use workspace_scan::adapters::outbound::tooling::DEFAULT_TOOL_TIMEOUT;
use workspace_scan::application::dto::ScanRequest;
use workspace_scan::application::factories::{
    FormatterFactory, PresenterFactory, PresenterType, ResolverFactory,
};
use workspace_scan::application::scan::{ScanContext, ScanManagerRegistry};
use workspace_scan::application::use_cases::ScanWorkspaceUseCase;
use workspace_scan::cli::Args;
use workspace_scan::config::{discover_config, load_config_from_path, ConfigFile};
use workspace_scan::ports::outbound::{FilterStateStore, VulnerabilityService};
use workspace_scan::scan_engine::domain::FilterSelection;
use workspace_scan::scan_engine::services::{ExcludeFilter, DEFAULT_EXCLUDE_PATTERNS};
use workspace_scan::shared::error::ExitCode;
use workspace_scan::shared::security::validate_workspace_dir;
use workspace_scan::shared::Result;

#[tokio::main]
async fn main() {
    // clap exits with code 2 on invalid arguments
    let args = Args::parse_args();
    init_tracing(&args);

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("workspace_scan={}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let workspace = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let canonical = validate_workspace_dir(&workspace)?;

    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => discover_config(&workspace)?.unwrap_or_default(),
    };

    let cache_dir = resolve_cache_dir(&args, &config)?;
    debug!(path = %cache_dir.display(), "Using cache directory");

    let mut patterns: Vec<String> = config.excluded_paths.clone().unwrap_or_else(|| {
        DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect()
    });
    patterns.extend(args.exclude.iter().cloned());
    let exclude = ExcludeFilter::new(patterns)?;

    let resolver_timeout = config
        .resolver_timeout
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOOL_TIMEOUT);

    let cache = FileSystemResultCache::new(&cache_dir, &canonical.display().to_string());
    let mut builder = ScanContext::builder(
        Arc::new(FileSystemPackageFinder::new()),
        Arc::new(cache),
        Arc::new(BroadcastEventSink::new()),
    )
    .exclude(exclude);
    for resolver in ResolverFactory::create_all(resolver_timeout) {
        builder = builder.resolver(resolver);
    }
    if let Some(service) = create_service(&args, &config)? {
        builder = builder.service(service);
    }

    let registry = Arc::new(ScanManagerRegistry::new(&canonical, builder.build())?);
    let use_case = ScanWorkspaceUseCase::new(Arc::clone(&registry));

    let interrupt_registry = Arc::clone(&registry);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling running scans");
            interrupt_registry.close();
        }
    });

    let store = FileSystemFilterStateStore::new(cache_dir.join(FILTERS_FILE_NAME));
    let mut selection = FilterSelection::restore(store.load());
    args.apply_filters(&mut selection);

    let fail_on = args.fail_on.or_else(|| config.fail_on_severity());
    let request = ScanRequest::new(!args.full, selection, fail_on);

    let spinner = ScanSpinner::new(!args.quiet && std::io::stderr().is_terminal());
    spinner.set_message(format!("🔍 Scanning {}...", canonical.display()));
    let response = match use_case.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            spinner.clear();
            return Err(e);
        }
    };
    spinner.finish(&format!(
        "✅ Scanned {} module(s), {} component(s)",
        response.report.summary.modules, response.report.summary.components
    ));

    for failed in response.failed_runs() {
        warn!(
            ecosystem = %failed.ecosystem,
            path = %failed.root.display(),
            "Module scan failed; results may be incomplete"
        );
    }

    if args.save_filters {
        if let Err(e) = store.save(&response.selection.state()) {
            warn!("Failed to save filter selection: {:#}", e);
        }
    }

    let format = match (args.format, config.format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => name.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        (None, None) => Default::default(),
    };
    if !args.quiet {
        eprintln!("{}", FormatterFactory::progress_message(format));
    }
    let formatted_output = FormatterFactory::create(format).format(&response.report)?;

    let presenter = PresenterFactory::create(PresenterType::for_output(args.output.clone()));
    presenter.present(&formatted_output)?;

    if response.has_issues_above_threshold {
        Ok(ExitCode::IssuesDetected)
    } else {
        Ok(ExitCode::Success)
    }
}

fn resolve_cache_dir(args: &Args, config: &ConfigFile) -> Result<PathBuf> {
    if let Some(dir) = args.cache_dir.clone().or_else(|| config.cache_dir.clone()) {
        return Ok(dir);
    }
    ProjectDirs::from("", "", "workspace-scan")
        .map(|dirs| dirs.cache_dir().join("cache"))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot determine a cache directory for this platform\n\n💡 Hint: Set cache_dir in workspace-scan.config.yml or pass --cache-dir"
            )
        })
}

/// Builds the service client; `None` when the URL or credentials are missing
fn create_service(
    args: &Args,
    config: &ConfigFile,
) -> Result<Option<Arc<dyn VulnerabilityService>>> {
    let Some(url) = args.url.clone().or_else(|| config.url.clone()) else {
        return Ok(None);
    };

    let token = args.token.clone().or_else(|| config.access_token.clone());
    let username = args.user.clone().or_else(|| config.username.clone());
    let password = args.password.clone().or_else(|| config.password.clone());
    let credentials = match (token, username, password) {
        (Some(token), _, _) => XrayCredentials::AccessToken(token),
        (None, Some(username), Some(password)) => XrayCredentials::Basic { username, password },
        _ => return Ok(None),
    };

    let timeout = Duration::from_secs(
        config
            .connection_timeout
            .unwrap_or(XrayClient::DEFAULT_TIMEOUT_SECONDS),
    );
    Ok(Some(Arc::new(XrayClient::new(&url, credentials, timeout)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("workspace-scan").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_resolve_cache_dir_prefers_flag_over_config() {
        let config = ConfigFile {
            cache_dir: Some(PathBuf::from("/from/config")),
            ..ConfigFile::default()
        };
        let dir = resolve_cache_dir(&args(&["--cache-dir", "/from/flag"]), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/flag"));

        let dir = resolve_cache_dir(&args(&[]), &config).unwrap();
        assert_eq!(dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_create_service_requires_credentials() {
        let config = ConfigFile {
            url: Some("https://acme.jfrog.io/xray".to_string()),
            ..ConfigFile::default()
        };
        let service = create_service(&args(&["--url", "https://acme.jfrog.io/xray"]), &config).unwrap();
        // Environment credentials would change the outcome
        if std::env::var_os("WORKSPACE_SCAN_TOKEN").is_none()
            && std::env::var_os("WORKSPACE_SCAN_USER").is_none()
        {
            assert!(service.is_none());
        }

        let service = create_service(
            &args(&["--url", "https://acme.jfrog.io/xray", "--token", "abc"]),
            &config,
        )
        .unwrap();
        assert!(service.is_some());
    }
}
