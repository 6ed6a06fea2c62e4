//! # Maintenance Commands
//!
//! Admin-only git flows against a managed app's checkout: `.update`
//! (fetch, pull, restart), `.branch` (forced checkout) and `.rollback`
//! (hard reset, restart). Git failures are surfaced verbatim; git's own
//! messages are the right diagnostic.

use anyhow::Result;

use super::{first_arg, render_result, resolve_app};
use crate::application::registry::AppRegistry;
use crate::domain::app::AppAction;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::AppExecutor;

const BRANCH_USAGE: &str = "\
Usage: `.branch <branch> [app]`

Example: `.branch main`
Example: `.branch develop myapp`";

const ROLLBACK_USAGE: &str = "\
Usage: `.rollback <number_of_commits> [app]`

Example: `.rollback 1`
Example: `.rollback 2 myapp`
Runs `git reset --hard HEAD~n` and restarts the app.";

/// `.update [app]`: fetch, pull, restart.
pub async fn handle_update(
    registry: &AppRegistry,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let Some(app) = resolve_app(registry, chat, first_arg(args)).await? else {
        return Ok(());
    };

    send(chat, &format!("Updating `{}`: running git fetch...", app.name)).await?;
    let fetch = executor.git_fetch(&app.path).await;
    if !fetch.success {
        return send(chat, &render_result("Git fetch failed", &fetch)).await;
    }

    send(chat, "Fetch complete, running git pull...").await?;
    let pull = executor.git_pull(&app.path).await;
    if !pull.success {
        return send(chat, &render_result("Git pull failed", &pull)).await;
    }

    send(
        chat,
        &format!("Pull complete:\n```\n{}\n```\nRestarting...", pull.output),
    )
    .await?;

    let restart = executor.run(app, AppAction::Restart, &[]).await;
    let title = format!("Update complete: {}", app.name);
    send(chat, &render_result(&title, &restart)).await
}

/// `.branch <branch> [app]`: fetch, then forced checkout.
pub async fn handle_branch(
    registry: &AppRegistry,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let mut parts = args.split_whitespace();
    let Some(branch) = parts.next() else {
        return send(chat, BRANCH_USAGE).await;
    };
    let app_name = parts.next();

    let Some(app) = resolve_app(registry, chat, app_name).await? else {
        return Ok(());
    };

    send(
        chat,
        &format!("Switching `{}` to branch `{}`...", app.name, branch),
    )
    .await?;

    // Fetch first so remote branches are known; checkout reports any failure.
    let _ = executor.git_fetch(&app.path).await;
    let result = executor.git_checkout(&app.path, branch).await;

    let title = format!("Branch switch: {}", app.name);
    send(chat, &render_result(&title, &result)).await
}

/// `.rollback <n> [app]`: hard reset, then restart.
pub async fn handle_rollback(
    registry: &AppRegistry,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let mut parts = args.split_whitespace();
    let Some(commits) = parts.next().and_then(parse_commit_count) else {
        return send(chat, ROLLBACK_USAGE).await;
    };
    let app_name = parts.next();

    let Some(app) = resolve_app(registry, chat, app_name).await? else {
        return Ok(());
    };

    send(
        chat,
        &format!(
            "Rolling back `{}` by {} commit(s): running `git reset --hard HEAD~{}`...",
            app.name, commits, commits
        ),
    )
    .await?;

    let reset = executor.git_reset(&app.path, commits).await;
    if !reset.success {
        return send(chat, &render_result("Git reset failed", &reset)).await;
    }

    send(
        chat,
        &format!("Reset complete:\n```\n{}\n```\nRestarting...", reset.output),
    )
    .await?;

    let restart = executor.run(app, AppAction::Restart, &[]).await;
    let title = format!("Rollback complete: {}", app.name);
    send(chat, &render_result(&title, &restart)).await
}

pub(crate) fn parse_commit_count(arg: &str) -> Option<u32> {
    match arg.parse::<u32>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

async fn send(chat: &impl ChatProvider, content: &str) -> Result<()> {
    chat.send_message(content).await.map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_count_must_be_a_positive_integer() {
        assert_eq!(parse_commit_count("1"), Some(1));
        assert_eq!(parse_commit_count("12"), Some(12));
        assert_eq!(parse_commit_count("0"), None);
        assert_eq!(parse_commit_count("-1"), None);
        assert_eq!(parse_commit_count("two"), None);
    }
}
