//! # Authorization
//!
//! Explicit guard evaluated by the router before any handler runs, keyed on
//! the sender id against the configured admin and allowed lists.

use crate::domain::config::BotConfig;

/// Level of access a sender has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Admin,
    User,
    Denied,
}

/// Resolve a sender's access level.
pub fn check(config: &BotConfig, sender: &str) -> Access {
    if config.is_admin(sender) {
        Access::Admin
    } else if config.is_authorized(sender) {
        Access::User
    } else {
        Access::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(admin: &[&str], allowed: &[&str]) -> BotConfig {
        let mut config: BotConfig = serde_yaml::from_str(
            "services:\n  matrix:\n    homeserver: h\n    username: u\n    password: p\n",
        )
        .unwrap();
        config.system.admin = admin.iter().map(|s| s.to_string()).collect();
        config.system.allowed = allowed.iter().map(|s| s.to_string()).collect();
        config
    }

    #[test]
    fn admins_outrank_allowed_users() {
        let config = config(&["@ops:example.org"], &["@dev:example.org"]);
        assert_eq!(check(&config, "@ops:example.org"), Access::Admin);
        assert_eq!(check(&config, "@dev:example.org"), Access::User);
        assert_eq!(check(&config, "@guest:example.org"), Access::Denied);
    }

    #[test]
    fn empty_lists_deny_everyone() {
        let config = config(&[], &[]);
        assert_eq!(check(&config, "@anyone:example.org"), Access::Denied);
    }
}
