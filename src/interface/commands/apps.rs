//! # Apps Command
//!
//! Handles `.apps`: lists the registered applications.

use anyhow::Result;

use crate::application::registry::AppRegistry;
use crate::domain::traits::ChatProvider;

pub async fn handle_apps(registry: &AppRegistry, chat: &impl ChatProvider) -> Result<()> {
    let mut lines = vec!["**Available Applications:**".to_string()];

    for app in registry.iter() {
        let default_marker = if app.name == registry.default_app() {
            " (default)"
        } else {
            ""
        };
        lines.push(format!("- `{}`{}", app.name, default_marker));
        if !app.description.is_empty() {
            lines.push(format!("  {}", app.description));
        }
    }

    chat.send_message(&lines.join("\n"))
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
