//! Controller configuration and per-call options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Document;

/// Namespace and caching behaviour of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Remote collection name; operations fail while this is empty.
    #[serde(default)]
    pub collection: String,

    /// Optional namespace prefix for URLs, cache keys, and channels.
    #[serde(default)]
    pub domain: String,

    /// Write fetched documents through to the local store.
    #[serde(default = "default_caching")]
    pub caching: bool,
}

fn default_caching() -> bool {
    true
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { collection: String::new(), domain: String::new(), caching: true }
    }
}

impl CacheOptions {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), ..Default::default() }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Skip the cached copy and read from the network.
    pub ignore_cache: bool,
}

impl GetOptions {
    pub fn ignore_cache() -> Self {
        Self { ignore_cache: true }
    }
}

/// Query names owned by the typed [`FetchOptions`] fields. Entries in
/// `params` with these names are dropped.
const RESERVED_PARAMS: &[&str] = &["ignoreCache", "ignore_cache", "offset", "index", "secondary"];

/// Options for listing a collection.
///
/// `offset`, `index`, `secondary`, and `params` are all forwarded to the
/// remote endpoint as query parameters; `ignore_cache` never is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub ignore_cache: bool,
    pub offset: Option<usize>,
    /// Index name the returned documents are filed under.
    pub index: Option<String>,
    /// Secondary value within `index`.
    pub secondary: Option<String>,
    /// Additional filter parameters.
    pub params: BTreeMap<String, String>,
}

impl FetchOptions {
    pub fn ignore_cache() -> Self {
        Self { ignore_cache: true, ..Default::default() }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Query parameters sent to the remote endpoint.
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(offset) = self.offset {
            query.push(("offset".into(), offset.to_string()));
        }
        if let Some(index) = &self.index {
            query.push(("index".into(), index.clone()));
        }
        if let Some(secondary) = &self.secondary {
            query.push(("secondary".into(), secondary.clone()));
        }
        query
    }
}

/// Result of [`fetch`](super::ResourceCache::fetch).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchResult {
    pub docs: Vec<Document>,
    /// Response metadata from the endpoint; empty when served from cache.
    pub data: Map<String, Value>,
}
