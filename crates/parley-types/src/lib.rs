//! Shared domain types for Parley.
//!
//! Chat sessions, messages, their API representations, configuration, and
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
