//! # Domain
//!
//! Core data types: managed-app configuration, bot configuration and the
//! abstract chat interface implemented by the Infrastructure layer.

pub mod app;
pub mod config;
pub mod traits;
