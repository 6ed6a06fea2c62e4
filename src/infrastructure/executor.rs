//! # App Executor
//!
//! Runs one external process to completion under a deadline: control scripts,
//! `git` and `tail`. Captures combined output, truncates it for the chat
//! transport's message limit, and folds every failure mode into a uniform
//! [`ExecutionResult`]. Nothing here propagates an error to the caller.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::app::{AppAction, AppConfig, LogStream};
use crate::domain::config::Timeouts;

/// Matrix messages cap out around 4096 characters; leave room for the
/// surrounding formatting.
pub const MAX_OUTPUT_LEN: usize = 3500;

pub const LOG_LINES_DEFAULT: u32 = 50;

const TRUNCATION_MARKER: &str = "...(truncated)...\n";

/// Outcome of one bounded external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    pub return_code: Option<i32>,
    pub error: Option<String>,
}

impl ExecutionResult {
    fn completed(success: bool, output: String, return_code: Option<i32>) -> Self {
        Self {
            success,
            output,
            return_code,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            return_code: None,
            error: Some(error),
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            return f.write_str(&self.output);
        }
        let error = self.error.as_deref().unwrap_or("unknown error");
        if self.output.is_empty() {
            write!(f, "Error: {error}")
        } else {
            write!(f, "Error: {error}\n\n{}", self.output)
        }
    }
}

/// Keeps the tail of over-long output, aligned to a line boundary.
/// Operators care about the most recent output (the end of a failing build),
/// not the head.
pub fn truncate_output(output: &str) -> String {
    let char_count = output.chars().count();
    if char_count <= MAX_OUTPUT_LEN {
        return output.to_string();
    }

    let skip = char_count - MAX_OUTPUT_LEN;
    let start = output
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut tail = &output[start..];

    // Drop the partial first line so the kept text starts at a line boundary.
    if let Some(newline) = tail.find('\n') {
        if newline > 0 {
            tail = &tail[newline + 1..];
        }
    }

    format!("{TRUNCATION_MARKER}{tail}")
}

/// Executes app-control and maintenance commands via subprocess.
#[derive(Debug, Clone)]
pub struct AppExecutor {
    timeouts: Timeouts,
}

impl AppExecutor {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    /// Run a control-script action for an app.
    pub async fn run(
        &self,
        app: &AppConfig,
        action: AppAction,
        extra_args: &[String],
    ) -> ExecutionResult {
        let script_path = app.script_path();
        let token = app.command_token(action);

        tracing::info!(
            "Executing {} {} for app '{}'",
            script_path.display(),
            token,
            app.name
        );

        let mut cmd = Command::new(&script_path);
        cmd.arg(token).args(extra_args).current_dir(&app.path);

        let result = self
            .run_bounded(cmd, &script_path, self.timeouts.default)
            .await;

        tracing::info!(
            "Command '{}' for app '{}' finished: success={} code={:?}",
            token,
            app.name,
            result.success,
            result.return_code
        );
        result
    }

    pub async fn git_pull(&self, dir: &Path) -> ExecutionResult {
        self.git(dir, &["pull"]).await
    }

    pub async fn git_fetch(&self, dir: &Path) -> ExecutionResult {
        self.git(dir, &["fetch"]).await
    }

    pub async fn git_checkout(&self, dir: &Path, branch: &str) -> ExecutionResult {
        self.git(dir, &["checkout", "--force", branch]).await
    }

    /// `git reset --hard HEAD~{commits}` in `dir`.
    pub async fn git_reset(&self, dir: &Path, commits: u32) -> ExecutionResult {
        let target = format!("HEAD~{commits}");
        self.git(dir, &["reset", "--hard", &target]).await
    }

    async fn git(&self, dir: &Path, args: &[&str]) -> ExecutionResult {
        tracing::info!("Running git {} in {}", args.join(" "), dir.display());
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(dir);
        self.run_bounded(cmd, Path::new("git"), self.timeouts.git)
            .await
    }

    /// Read recent lines from one of an app's log files.
    pub async fn get_logs(
        &self,
        app: &AppConfig,
        stream: LogStream,
        lines: u32,
    ) -> ExecutionResult {
        tracing::info!(
            "Reading {} lines of {} logs for app '{}'",
            lines,
            stream.as_str(),
            app.name
        );
        self.read_log_file(app.log_path(stream), lines).await
    }

    /// Tail an arbitrary log file. Fails fast (no process spawn) when the
    /// file does not exist.
    pub async fn read_log_file(&self, path: &Path, lines: u32) -> ExecutionResult {
        if !path.exists() {
            return ExecutionResult::failed(format!("Log file not found: {}", path.display()));
        }

        let mut cmd = Command::new("tail");
        cmd.arg("-n").arg(lines.to_string()).arg(path);
        self.run_bounded(cmd, Path::new("tail"), self.timeouts.tail)
            .await
    }

    /// Fire-and-forget restart of the process hosting this executor.
    ///
    /// Spawns a detached child in its own session that sleeps 2 seconds and
    /// then invokes the control script's restart action. The delay guarantees
    /// the restart fires only after this process has had time to exit, and
    /// the new session keeps the child alive past our own shutdown.
    pub fn self_restart(&self, script_path: &Path) -> ExecutionResult {
        let command_line = format!("sleep 2 && {} restart", script_path.display());
        tracing::info!("Scheduling self restart: {}", command_line);

        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c")
            .arg(&command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Detach into a new session so our exit does not signal the child.
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        match cmd.spawn() {
            // Intentionally not waited on; init reaps it after we exit.
            Ok(_child) => ExecutionResult::completed(true, String::new(), None),
            Err(e) => {
                tracing::error!("Failed to schedule self restart: {}", e);
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    /// Pull the bot's own checkout and, only if the pull succeeded, schedule
    /// a detached restart. Returns the pull result either way; the restart
    /// side effect shows up only as this process disappearing shortly after.
    pub async fn self_update(&self, dir: &Path, script_path: &Path) -> ExecutionResult {
        let pull = self.git_pull(dir).await;
        if pull.success {
            self.self_restart(script_path);
        }
        pull
    }

    /// Core primitive: spawn, wait with a deadline, capture combined output.
    ///
    /// The child is spawned with `kill_on_drop`, so a timeout kills it rather
    /// than leaving it orphaned.
    async fn run_bounded(
        &self,
        mut cmd: Command,
        program: &Path,
        timeout_secs: u64,
    ) -> ExecutionResult {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::error!("Executable not found: {}", program.display());
                return ExecutionResult::failed(format!(
                    "Script not found: {}",
                    program.display()
                ));
            }
            Err(e) => {
                tracing::error!("Failed to spawn {}: {}", program.display(), e);
                return ExecutionResult::failed(e.to_string());
            }
        };

        let deadline = Duration::from_secs(timeout_secs);
        match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                ExecutionResult::completed(
                    output.status.success(),
                    truncate_output(&combined),
                    output.status.code(),
                )
            }
            Ok(Err(e)) => ExecutionResult::failed(e.to_string()),
            Err(_elapsed) => {
                tracing::error!(
                    "Command {} timed out after {}s",
                    program.display(),
                    timeout_secs
                );
                ExecutionResult::failed(format!(
                    "Command timed out after {timeout_secs} seconds"
                ))
            }
        }
    }
}
