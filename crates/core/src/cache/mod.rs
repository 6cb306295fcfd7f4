//! SQLite-backed local store.
//!
//! This module provides a persistent implementation of [`LocalStore`] using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Primary by-id document slots per cache key
//! - Ordered default, index, and secondary index sets
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! [`LocalStore`]: crate::store::LocalStore

pub mod connection;
pub mod documents;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
