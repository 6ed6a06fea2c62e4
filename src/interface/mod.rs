//! # Interface
//!
//! Chat-facing command handlers, invoked by the router.

pub mod commands;
