//! # Application
//!
//! Orchestration: the app registry, the authorization guard and the command
//! router that ties chat messages to handlers.

pub mod auth;
pub mod registry;
pub mod router;
