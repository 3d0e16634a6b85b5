//! Chat session and message persistence for Parley.
//!
//! `repository` defines the `ChatRepository` port, `service` layers the
//! session operations on top of it, and `title` holds the auto-title rule.

pub mod repository;
pub mod service;
pub mod title;
