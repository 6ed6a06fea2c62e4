//! # Managed Application Model
//!
//! `AppConfig` describes one application under management: where it lives,
//! which control script drives it, and how abstract actions map onto the
//! script's command tokens.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The closed set of actions a control script understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Start,
    Stop,
    Restart,
    Status,
    Logs,
    Build,
}

impl AppAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AppAction::Start => "start",
            AppAction::Stop => "stop",
            AppAction::Restart => "restart",
            AppAction::Status => "status",
            AppAction::Logs => "logs",
            AppAction::Build => "build",
        }
    }
}

impl fmt::Display for AppAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of an app's two log files to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogStream {
    #[default]
    Backend,
    Frontend,
}

impl LogStream {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStream::Backend => "backend",
            LogStream::Frontend => "frontend",
        }
    }
}

impl FromStr for LogStream {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backend" => Ok(LogStream::Backend),
            "frontend" => Ok(LogStream::Frontend),
            _ => Err(()),
        }
    }
}

/// Configuration for a single managed application.
/// Matches one entry of the `apps:` list in `data/apps.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default)]
    pub description: String,

    // Per-action token overrides. When absent, the action name itself is
    // passed to the control script.
    #[serde(default)]
    pub(crate) cmd_start: Option<String>,
    #[serde(default)]
    pub(crate) cmd_stop: Option<String>,
    #[serde(default)]
    pub(crate) cmd_restart: Option<String>,
    #[serde(default)]
    pub(crate) cmd_status: Option<String>,
    #[serde(default)]
    pub(crate) cmd_logs: Option<String>,
    #[serde(default)]
    pub(crate) cmd_build: Option<String>,

    #[serde(default = "default_log_backend")]
    pub log_backend: PathBuf,
    #[serde(default = "default_log_frontend")]
    pub log_frontend: PathBuf,
}

fn default_script() -> String {
    "scripts/dev.sh".to_string()
}

fn default_log_backend() -> PathBuf {
    PathBuf::from("/tmp/bot.log")
}

fn default_log_frontend() -> PathBuf {
    PathBuf::from("/tmp/frontend.log")
}

impl AppConfig {
    /// Full path to the control script.
    pub fn script_path(&self) -> PathBuf {
        self.path.join(&self.script)
    }

    /// The token passed to the control script for an action.
    pub fn command_token(&self, action: AppAction) -> &str {
        let override_token = match action {
            AppAction::Start => &self.cmd_start,
            AppAction::Stop => &self.cmd_stop,
            AppAction::Restart => &self.cmd_restart,
            AppAction::Status => &self.cmd_status,
            AppAction::Logs => &self.cmd_logs,
            AppAction::Build => &self.cmd_build,
        };
        override_token.as_deref().unwrap_or(action.as_str())
    }

    /// Log file location for a stream.
    pub fn log_path(&self, stream: LogStream) -> &Path {
        match stream {
            LogStream::Backend => &self.log_backend,
            LogStream::Frontend => &self.log_frontend,
        }
    }

    /// Advisory validation: checked at load time and logged, but a failing
    /// app is still registered so execution reports a clear error later.
    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("App path does not exist: {}", self.path.display()));
        }
        let script_path = self.script_path();
        if !script_path.exists() {
            return Err(format!("Script does not exist: {}", script_path.display()));
        }
        if !script_path.is_file() {
            return Err(format!("Script is not a file: {}", script_path.display()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_from_yaml(yaml: &str) -> AppConfig {
        serde_yaml::from_str(yaml).expect("valid app yaml")
    }

    #[test]
    fn defaults_applied_for_minimal_entry() {
        let app = app_from_yaml("name: web\npath: /srv/web\n");
        assert_eq!(app.script, "scripts/dev.sh");
        assert_eq!(app.script_path(), PathBuf::from("/srv/web/scripts/dev.sh"));
        assert_eq!(app.log_backend, PathBuf::from("/tmp/bot.log"));
        assert_eq!(app.log_frontend, PathBuf::from("/tmp/frontend.log"));
    }

    #[test]
    fn command_token_falls_back_to_action_name() {
        let app = app_from_yaml("name: web\npath: /srv/web\n");
        assert_eq!(app.command_token(AppAction::Start), "start");
        assert_eq!(app.command_token(AppAction::Build), "build");
    }

    #[test]
    fn command_token_uses_configured_override() {
        let app = app_from_yaml("name: web\npath: /srv/web\ncmd_status: state\n");
        assert_eq!(app.command_token(AppAction::Status), "state");
        assert_eq!(app.command_token(AppAction::Stop), "stop");
    }

    #[test]
    fn log_stream_parsing() {
        assert_eq!("backend".parse(), Ok(LogStream::Backend));
        assert_eq!("Frontend".parse(), Ok(LogStream::Frontend));
        assert!("sideways".parse::<LogStream>().is_err());
    }

    #[test]
    fn validate_rejects_missing_path_and_script() {
        let app = app_from_yaml("name: web\npath: /nonexistent/web\n");
        let err = app.validate().unwrap_err();
        assert!(err.contains("App path does not exist"));

        let dir = tempfile::tempdir().unwrap();
        let app = app_from_yaml(&format!("name: web\npath: {}\n", dir.path().display()));
        let err = app.validate().unwrap_err();
        assert!(err.contains("Script does not exist"));
    }

    #[test]
    fn validate_accepts_existing_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(dir.path().join("scripts/dev.sh"), "#!/bin/sh\n").unwrap();

        let app = app_from_yaml(&format!("name: web\npath: {}\n", dir.path().display()));
        assert!(app.validate().is_ok());
    }
}
