//! # Logs Command
//!
//! Handles `.logs [app] [backend|frontend]`. The two argument kinds may
//! appear in either order; anything that is not a stream name is treated as
//! the app name.

use anyhow::Result;

use super::resolve_app;
use crate::application::registry::AppRegistry;
use crate::domain::app::LogStream;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::executor::{AppExecutor, LOG_LINES_DEFAULT};

pub async fn handle_logs(
    registry: &AppRegistry,
    executor: &AppExecutor,
    chat: &impl ChatProvider,
    args: &str,
) -> Result<()> {
    let mut app_name: Option<&str> = None;
    let mut stream = LogStream::default();

    for arg in args.split_whitespace() {
        match arg.parse::<LogStream>() {
            Ok(parsed) => stream = parsed,
            Err(()) => app_name = Some(arg),
        }
    }

    let Some(app) = resolve_app(registry, chat, app_name).await? else {
        return Ok(());
    };

    let _ = chat.typing(true).await;
    let result = executor.get_logs(app, stream, LOG_LINES_DEFAULT).await;
    let _ = chat.typing(false).await;

    let message = if result.success {
        format!(
            "**Logs: {} ({})**\n\n```\n{}\n```",
            app.name,
            stream.as_str(),
            result.output
        )
    } else {
        format!("❌ Error: {}", result.error.as_deref().unwrap_or("unknown error"))
    };

    chat.send_message(&message).await.map_err(|e| anyhow::anyhow!(e))
}
