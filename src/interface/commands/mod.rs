//! # Command Handlers
//!
//! One module per command family. Handlers resolve the target app, invoke
//! the executor and render the `ExecutionResult` back to the chat.

pub mod apps;
pub mod control;
pub mod help;
pub mod logs;
pub mod maintain;
pub mod selfctl;

use anyhow::Result;

use crate::application::registry::AppRegistry;
use crate::domain::app::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::ExecutionResult;

/// Render a result with a status icon and fenced output.
pub(crate) fn render_result(title: &str, result: &ExecutionResult) -> String {
    let icon = if result.success { "✅" } else { "❌" };
    format!("{icon} **{title}**\n\n```\n{result}\n```")
}

/// First whitespace-separated token of the arguments, as the app name.
pub(crate) fn first_arg(args: &str) -> Option<&str> {
    args.split_whitespace().next()
}

/// Resolve an app name, reporting a not-found error to the chat.
/// Returns `None` when the handler should stop.
pub(crate) async fn resolve_app<'a, C: ChatProvider>(
    registry: &'a AppRegistry,
    chat: &C,
    name: Option<&str>,
) -> Result<Option<&'a AppConfig>> {
    match registry.resolve(name) {
        Ok(app) => Ok(Some(app)),
        Err(e) => {
            chat.send_message(&format!("Error: {e}"))
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            Ok(None)
        }
    }
}
