//! Infrastructure layer for Parley.
//!
//! Contains implementations of the repository traits defined in `parley-core`
//! (SQLite storage) plus configuration loading and data-directory resolution.

pub mod config;
pub mod sqlite;
