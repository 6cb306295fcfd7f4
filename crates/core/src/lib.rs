//! Core types and cache policy for httpcache.
//!
//! This crate provides:
//! - The resource cache controller (cache-vs-network policy per operation)
//! - Two-level document indexing with cascade removal
//! - Local store, transport, and notification contracts
//! - In-memory and SQLite-backed store implementations
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod index;
pub mod keys;
pub mod notify;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::CacheDb;
pub use controller::{CacheOptions, FetchOptions, FetchResult, GetOptions, Operation, ResourceCache};
pub use document::{DocId, Document};
pub use error::Error;
pub use index::{IndexMap, Indexer};
pub use notify::{BroadcastNotifier, CacheEvent, CacheUpdate, NoopNotifier, Notifier};
pub use store::{LocalStore, MemoryStore, SetScope};
pub use transport::{Method, ResourceRequest, Transport, TransportError};
