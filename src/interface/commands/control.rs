//! # Control Commands
//!
//! Handles `.status`, `.start`, `.stop`, `.restart` and `.build` — the five
//! actions driven through an app's control script.

use anyhow::Result;

use super::{first_arg, render_result, resolve_app};
use crate::application::registry::AppRegistry;
use crate::domain::app::AppAction;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::AppExecutor;

pub async fn handle_action(
    registry: &AppRegistry,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    action: AppAction,
    args: &str,
) -> Result<()> {
    let Some(app) = resolve_app(registry, chat, first_arg(args)).await? else {
        return Ok(());
    };

    let _ = chat.typing(true).await;
    let result = executor.run(app, action, &[]).await;
    let _ = chat.typing(false).await;

    let title = format!("{}: {}", action, app.name);
    chat.send_message(&render_result(&title, &result))
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
