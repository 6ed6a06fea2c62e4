//! # Command Router
//!
//! Routes incoming chat messages to the appropriate command handler (in
//! `interface/commands`). The authorization guard runs here, before any
//! handler body, so it stays visible and testable in one place.

use anyhow::Result;
use std::sync::Arc;

use crate::application::auth::{self, Access};
use crate::application::registry::AppRegistry;
use crate::domain::config::BotConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::AppExecutor;
use crate::interface::commands;

const NOT_AUTHORIZED: &str =
    "You are not authorized to use this bot. Contact an administrator if you need access.";
const ADMIN_REQUIRED: &str = "This command requires admin privileges.";
const UNKNOWN_COMMAND: &str = "Unknown command. Use `.help` to see available commands.";

/// Commands that mutate checkouts or the bot itself.
const ADMIN_COMMANDS: &[&str] = &[
    ".update",
    ".branch",
    ".rollback",
    ".self_update",
    ".self_restart",
    ".self_logs",
    ".self_rollback",
];

pub struct CommandRouter {
    config: BotConfig,
    registry: Arc<AppRegistry>,
    executor: Arc<AppExecutor>,
}

impl CommandRouter {
    pub fn new(config: BotConfig, registry: Arc<AppRegistry>, executor: Arc<AppExecutor>) -> Self {
        Self {
            config,
            registry,
            executor,
        }
    }

    pub async fn route<C: ChatProvider>(&self, chat: &C, message: &str, sender: &str) -> Result<()> {
        let msg = message.trim();
        if !msg.starts_with('.') {
            return Ok(());
        }

        let (cmd, args) = match msg.find(' ') {
            Some(idx) => (&msg[..idx], msg[idx + 1..].trim()),
            None => (msg, ""),
        };

        tracing::info!("Routing cmd='{}' args='{}' sender='{}'", cmd, args, sender);

        match auth::check(&self.config, sender) {
            Access::Denied => {
                tracing::warn!("Unauthorized access attempt by '{}': {}", sender, cmd);
                let _ = chat.send_message(NOT_AUTHORIZED).await;
                return Ok(());
            }
            Access::User if ADMIN_COMMANDS.contains(&cmd) => {
                tracing::warn!("Non-admin '{}' attempted admin command {}", sender, cmd);
                let _ = chat.send_message(ADMIN_REQUIRED).await;
                return Ok(());
            }
            Access::User | Access::Admin => {}
        }

        match cmd {
            ".help" => commands::help::handle_help(chat).await?,
            ".apps" => commands::apps::handle_apps(&self.registry, chat).await?,
            ".status" | ".start" | ".stop" | ".restart" | ".build" => {
                let action = match cmd {
                    ".status" => crate::domain::app::AppAction::Status,
                    ".start" => crate::domain::app::AppAction::Start,
                    ".stop" => crate::domain::app::AppAction::Stop,
                    ".restart" => crate::domain::app::AppAction::Restart,
                    _ => crate::domain::app::AppAction::Build,
                };
                commands::control::handle_action(&self.registry, &self.executor, chat, action, args)
                    .await?;
            }
            ".logs" => {
                commands::logs::handle_logs(&self.registry, &self.executor, chat, args).await?;
            }
            ".update" => {
                commands::maintain::handle_update(&self.registry, &self.executor, chat, args)
                    .await?;
            }
            ".branch" => {
                commands::maintain::handle_branch(&self.registry, &self.executor, chat, args)
                    .await?;
            }
            ".rollback" => {
                commands::maintain::handle_rollback(&self.registry, &self.executor, chat, args)
                    .await?;
            }
            ".self_update" => {
                commands::selfctl::handle_self_update(&self.config, &self.executor, chat).await?;
            }
            ".self_restart" => {
                commands::selfctl::handle_self_restart(&self.config, &self.executor, chat).await?;
            }
            ".self_logs" => {
                commands::selfctl::handle_self_logs(&self.config, &self.executor, chat).await?;
            }
            ".self_rollback" => {
                commands::selfctl::handle_self_rollback(&self.config, &self.executor, chat, args)
                    .await?;
            }
            _ => {
                let _ = chat.send_message(UNKNOWN_COMMAND).await;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Chat double that records every message sent to it.
    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingChat {
        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for RecordingChat {
        async fn send_message(&self, content: &str) -> Result<(), String> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }

        async fn typing(&self, _active: bool) -> Result<(), String> {
            Ok(())
        }

        fn room_id(&self) -> String {
            "!test:example.org".to_string()
        }
    }

    fn router() -> CommandRouter {
        let mut config: BotConfig = serde_yaml::from_str(
            "services:\n  matrix:\n    homeserver: h\n    username: u\n    password: p\n",
        )
        .unwrap();
        config.system.admin = vec!["@ops:example.org".to_string()];
        config.system.allowed = vec!["@dev:example.org".to_string()];

        let registry = AppRegistry::from_yaml("apps:\n  - name: web\n    path: /srv/web\n").unwrap();
        let executor = AppExecutor::new(crate::domain::config::Timeouts::default());
        CommandRouter::new(config, Arc::new(registry), Arc::new(executor))
    }

    #[tokio::test]
    async fn non_command_messages_are_ignored() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, "hello there", "@dev:example.org")
            .await
            .unwrap();
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_sender_is_rejected() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, ".status", "@guest:example.org")
            .await
            .unwrap();
        assert_eq!(chat.messages(), vec![NOT_AUTHORIZED.to_string()]);
    }

    #[tokio::test]
    async fn non_admin_cannot_run_admin_commands() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, ".update web", "@dev:example.org")
            .await
            .unwrap();
        assert_eq!(chat.messages(), vec![ADMIN_REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn unknown_command_gets_a_notice() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, ".frobnicate", "@dev:example.org")
            .await
            .unwrap();
        assert_eq!(chat.messages(), vec![UNKNOWN_COMMAND.to_string()]);
    }

    #[tokio::test]
    async fn apps_listing_names_the_default() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, ".apps", "@dev:example.org")
            .await
            .unwrap();
        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("web"));
        assert!(messages[0].contains("(default)"));
    }

    #[tokio::test]
    async fn unknown_app_error_reaches_the_chat() {
        let chat = RecordingChat::default();
        router()
            .route(&chat, ".status nope", "@ops:example.org")
            .await
            .unwrap();
        let messages = chat.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Unknown app: 'nope'"));
        assert!(messages[0].contains("web"));
    }
}
