use crate::shared::Result;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default limit for one resolver process
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// Maximum number of stderr characters kept for error messages
const MAX_STDERR_CHARS: usize = 2000;

/// An ecosystem tool started as an external process
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Looks the program up on `PATH`
    pub fn find_executable(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }

        let candidates: Vec<String> = if cfg!(windows) {
            ["exe", "cmd", "bat"]
                .iter()
                .map(|ext| format!("{}.{}", self.program, ext))
                .collect()
        } else {
            vec![self.program.clone()]
        };

        let path = env::var_os("PATH")?;
        env::split_paths(&path).find_map(|dir| {
            candidates
                .iter()
                .map(|c| dir.join(c))
                .find(|candidate| candidate.is_file())
        })
    }

    pub fn is_available(&self) -> bool {
        self.find_executable().is_some()
    }

    /// Runs the program in `cwd` and captures its output, whatever the exit
    /// status.
    ///
    /// The child is killed when the timeout elapses or the returned future
    /// is dropped.
    ///
    /// # Errors
    /// Returns an error if the program cannot be found, started, or times out
    pub async fn output(&self, args: &[&str], cwd: &Path) -> Result<ToolOutput> {
        let executable = self
            .find_executable()
            .ok_or_else(|| anyhow::anyhow!("{}: command not found in PATH", self.program))?;

        info!(program = %self.program, ?args, cwd = %cwd.display(), "Running ecosystem tool");
        let child = Command::new(&executable)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, child)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} did not finish within {} seconds",
                    self.program,
                    self.timeout.as_secs()
                )
            })?
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", self.program, e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let result = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: stderr.trim().chars().take(MAX_STDERR_CHARS).collect(),
            status: output.status.to_string(),
            success: output.status.success(),
        };
        debug!(
            program = %self.program,
            bytes = result.stdout.len(),
            success = result.success,
            "Tool finished"
        );
        Ok(result)
    }

    /// Runs the program and returns its stdout, failing on a non-zero exit
    pub async fn run(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let output = self.output(args, cwd).await?;
        if !output.success {
            anyhow::bail!("{} {} {}", self.program, args.join(" "), output.failure());
        }
        Ok(output.stdout)
    }
}

/// Captured result of a finished tool process
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    /// Trimmed and truncated
    pub stderr: String,
    pub status: String,
    pub success: bool,
}

impl ToolOutput {
    /// Short description of a failed run
    pub fn failure(&self) -> String {
        let stderr = if self.stderr.is_empty() {
            "no error output"
        } else {
            self.stderr.as_str()
        };
        format!("exited with {}: {}", self.status, stderr)
    }
}
