//! HTTP transport for httpcache.
//!
//! This crate provides the reqwest-backed [`Transport`] implementation used
//! by the resource cache controller, plus base URL canonicalization.
//!
//! [`Transport`]: httpcache_core::Transport

pub mod error;
pub mod transport;
pub mod url;

pub use error::ClientError;
pub use transport::{HttpConfig, HttpTransport};
pub use url::{UrlError, canonicalize_base};
