//! # Bot Configuration
//!
//! Matches the layout of `data/config.yaml`. Everything beyond the Matrix
//! credentials has a sensible default so a minimal config stays minimal.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl BotConfig {
    pub fn is_admin(&self, sender: &str) -> bool {
        let sender_lower = sender.to_lowercase();
        self.system
            .admin
            .iter()
            .any(|u| u.to_lowercase() == sender_lower)
    }

    pub fn is_authorized(&self, sender: &str) -> bool {
        if self.is_admin(sender) {
            return true;
        }
        let sender_lower = sender.to_lowercase();
        self.system
            .allowed
            .iter()
            .any(|u| u.to_lowercase() == sender_lower)
    }
}

/// Configuration for connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// System-level settings for the bot itself.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    /// Senders allowed to run admin commands.
    #[serde(default)]
    pub admin: Vec<String>,
    /// Additional senders allowed to run non-admin commands.
    #[serde(default)]
    pub allowed: Vec<String>,
    /// Path to the managed-apps registry file.
    #[serde(default = "default_apps_file")]
    pub apps_file: PathBuf,
    /// Checkout directory of the bot itself, for self_update/self_rollback.
    #[serde(default = "default_bot_dir")]
    pub bot_dir: PathBuf,
    /// Control script used to restart the bot itself.
    #[serde(default = "default_bot_script")]
    pub bot_script: PathBuf,
    /// Log file served by the self_logs command.
    #[serde(default = "default_bot_log")]
    pub bot_log: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            admin: Vec::new(),
            allowed: Vec::new(),
            apps_file: default_apps_file(),
            bot_dir: default_bot_dir(),
            bot_script: default_bot_script(),
            bot_log: default_bot_log(),
        }
    }
}

fn default_apps_file() -> PathBuf {
    PathBuf::from("data/apps.yaml")
}

fn default_bot_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bot_script() -> PathBuf {
    PathBuf::from("scripts/dev.sh")
}

fn default_bot_log() -> PathBuf {
    PathBuf::from("data/session.log")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommandsConfig {
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Per-call timeouts in seconds for the three classes of bounded invocation.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Timeouts {
    #[serde(default = "default_command_timeout")]
    pub default: u64,
    #[serde(default = "default_git_timeout")]
    pub git: u64,
    #[serde(default = "default_tail_timeout")]
    pub tail: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: default_command_timeout(),
            git: default_git_timeout(),
            tail: default_tail_timeout(),
        }
    }
}

fn default_command_timeout() -> u64 {
    60
}

fn default_git_timeout() -> u64 {
    120
}

fn default_tail_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
services:
  matrix:
    homeserver: https://matrix.example.org
    username: steward
    password: hunter2
";

    #[test]
    fn minimal_config_gets_defaults() {
        let config: BotConfig = serde_yaml::from_str(MINIMAL).unwrap();
        assert_eq!(config.system.apps_file, PathBuf::from("data/apps.yaml"));
        assert_eq!(config.commands.timeouts.default, 60);
        assert_eq!(config.commands.timeouts.git, 120);
        assert_eq!(config.commands.timeouts.tail, 10);
        assert!(config.system.admin.is_empty());
    }

    #[test]
    fn auth_predicates_are_case_insensitive() {
        let mut config: BotConfig = serde_yaml::from_str(MINIMAL).unwrap();
        config.system.admin = vec!["@Ops:Example.org".to_string()];
        config.system.allowed = vec!["@dev:example.org".to_string()];

        assert!(config.is_admin("@ops:example.org"));
        assert!(config.is_authorized("@ops:example.org"));
        assert!(!config.is_admin("@dev:example.org"));
        assert!(config.is_authorized("@DEV:example.org"));
        assert!(!config.is_authorized("@stranger:example.org"));
    }
}
