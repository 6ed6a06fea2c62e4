//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: configuration and managed-app types
//! - Infrastructure: Matrix transport, subprocess executor
//! - Application: registry, auth guard, command router
//! - Interface: command handlers

mod application;
mod domain;
mod infrastructure;
mod interface;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::SyncRoomMessageEvent,
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::registry::AppRegistry;
use crate::application::router::CommandRouter;
use crate::domain::config::BotConfig;
use crate::infrastructure::executor::AppExecutor;
use crate::infrastructure::matrix::MatrixService;

#[derive(Parser)]
#[command(name = "steward", about = "Chat-driven manager for locally hosted applications")]
struct Cli {
    /// Path to the bot configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config_content = fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read {}", cli.config.display()))?;
    let config: BotConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse bot configuration")?;

    // 2. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting steward...");

    // 3. Load the app registry. Fatal on failure: the bot must not serve
    // requests without a valid catalog.
    let registry = match AppRegistry::load(&config.system.apps_file) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(
                "Failed to load apps configuration from {}: {}",
                config.system.apps_file.display(),
                e
            );
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Loaded {} app(s): {:?} (default: {})",
        registry.len(),
        registry.names(),
        registry.default_app()
    );

    let registry = Arc::new(registry);
    let executor = Arc::new(AppExecutor::new(config.commands.timeouts));

    // 4. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    if let Some(name) = &config.services.matrix.display_name {
        if let Err(e) = client.account().set_display_name(Some(name)).await {
            tracing::warn!("Failed to set display name: {}", e);
        }
    }

    // 5. Event Loop
    let start_time = std::time::SystemTime::now();
    let loop_config = config.clone();
    let loop_registry = registry.clone();
    let loop_executor = executor.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let config = loop_config.clone();
        let registry = loop_registry.clone();
        let executor = loop_executor.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events from before startup (replayed by initial sync).
            let ts = ev.origin_server_ts();
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            if let matrix_sdk::ruma::events::room::message::MessageType::Text(text_content) =
                &original_msg.content.msgtype
            {
                if original_msg.sender == room.own_user_id() {
                    return;
                }

                let chat = MatrixService::new(room);
                let router = CommandRouter::new(config, registry, executor);

                if let Err(e) = router
                    .route(&chat, &text_content.body, original_msg.sender.as_str())
                    .await
                {
                    tracing::error!("Failed to route message: {}", e);
                }
            }
        }
    });

    // Join rooms we get invited to.
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            let _ = room.join().await;
        }
    });

    client.sync(SyncSettings::default()).await?;

    Ok(())
}
