//! # Infrastructure
//!
//! Adapters to the outside world: the subprocess executor and the Matrix
//! chat transport.

pub mod executor;
pub mod matrix;
