//! # Help Command
//!
//! Handles `.help`.

use anyhow::Result;

use crate::domain::traits::ChatProvider;

const MAIN: &str = "\
**Application Manager**

**Basic:**
`.help` - Show this help
`.apps` - List managed applications

**Application Management:**
`.status [app]` - Show application status
`.start [app]` - Start application
`.stop [app]` - Stop application
`.restart [app]` - Restart application
`.build [app]` - Build application
`.logs [app] [backend|frontend]` - Show recent logs

**Admin:**
`.update [app]` - Git fetch, pull and restart
`.branch <branch> [app]` - Switch git branch
`.rollback <n> [app]` - Reset n commits and restart
`.self_update` - Update and restart this bot
`.self_restart` - Restart this bot
`.self_logs` - Show this bot's logs
`.self_rollback <n>` - Reset n commits on this bot

_If `[app]` is omitted, the default app is used._";

pub async fn handle_help(chat: &impl ChatProvider) -> Result<()> {
    chat.send_message(MAIN).await.map_err(|e| anyhow::anyhow!(e))
}
