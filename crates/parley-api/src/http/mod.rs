//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API at `/api/chat/` exposing session CRUD and the
//! message sub-resources.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
