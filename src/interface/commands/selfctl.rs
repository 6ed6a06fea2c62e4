//! # Self Commands
//!
//! Admin-only operations against the bot's own checkout: `.self_update`,
//! `.self_restart`, `.self_logs` and `.self_rollback`. Restarts are
//! scheduled as a detached process, so the reply reaches the room before
//! this process goes away.

use anyhow::Result;

use super::render_result;
use crate::domain::config::BotConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::{AppExecutor, LOG_LINES_DEFAULT};

const SELF_ROLLBACK_USAGE: &str = "\
Usage: `.self_rollback <number_of_commits>`

Example: `.self_rollback 1`
Runs `git reset --hard HEAD~n` and restarts the bot.";

/// `.self_update`: git pull the bot's checkout, restart only on success.
pub async fn handle_self_update(
    config: &BotConfig,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
) -> Result<()> {
    send(chat, "Updating bot: running git pull...").await?;

    let pull = executor
        .self_update(&config.system.bot_dir, &config.system.bot_script)
        .await;

    if pull.success {
        send(
            chat,
            &format!(
                "Pull complete:\n```\n{}\n```\nRestarting in 2 seconds...",
                pull.output
            ),
        )
        .await
    } else {
        send(chat, &render_result("Git pull failed", &pull)).await
    }
}

/// `.self_restart`: schedule a detached restart of this bot.
pub async fn handle_self_restart(
    config: &BotConfig,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
) -> Result<()> {
    send(chat, "Restarting bot in 2 seconds...").await?;
    let result = executor.self_restart(&config.system.bot_script);
    if !result.success {
        send(chat, &render_result("Restart failed", &result)).await?;
    }
    Ok(())
}

/// `.self_logs`: tail the bot's own log file.
pub async fn handle_self_logs(
    config: &BotConfig,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
) -> Result<()> {
    let result = executor
        .read_log_file(&config.system.bot_log, LOG_LINES_DEFAULT)
        .await;

    let message = if result.success {
        format!("**Bot Logs:**\n\n```\n{}\n```", result.output)
    } else {
        format!("❌ Error: {}", result.error.as_deref().unwrap_or("unknown error"))
    };
    send(chat, &message).await
}

/// `.self_rollback <n>`: hard reset the bot's checkout, then restart.
pub async fn handle_self_rollback(
    config: &BotConfig,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let parsed = super::first_arg(args).and_then(super::maintain::parse_commit_count);
    let Some(commits) = parsed else {
        return send(chat, SELF_ROLLBACK_USAGE).await;
    };

    send(
        chat,
        &format!("Rolling back {commits} commit(s): running `git reset --hard HEAD~{commits}`..."),
    )
    .await?;

    let reset = executor.git_reset(&config.system.bot_dir, commits).await;
    if !reset.success {
        return send(chat, &render_result("Git reset failed", &reset)).await;
    }

    send(
        chat,
        &format!(
            "Reset complete:\n```\n{}\n```\nRestarting in 2 seconds...",
            reset.output
        ),
    )
    .await?;

    executor.self_restart(&config.system.bot_script);
    Ok(())
}

async fn send(chat: &impl ChatProvider, content: &str) -> Result<()> {
    chat.send_message(content).await.map_err(|e| anyhow::anyhow!(e))
}
