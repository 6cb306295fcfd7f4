//! Resource cache controller.
//!
//! [`ResourceCache`] mediates every read and write against one remote
//! collection. Reads are served from the local store when possible; network
//! results and successful mutations are written through the [`Indexer`] so
//! the local copy stays consistent.
//!
//! ### Read policy
//!
//! - `get` returns the cached document whenever one exists and the caller did
//!   not ask to bypass the cache. The copy may be stale.
//! - `fetch` returns the cached list when one exists, the cache is not
//!   bypassed, and the requested `offset` falls inside the cached list.
//! - Each call settles exactly once. A cache hit returns immediately and no
//!   background revalidation is started; callers that want fresh data pass
//!   `ignore_cache` and observe the result on the notification channel.

mod options;
mod validation;


pub use options::{CacheOptions, FetchOptions, FetchResult, GetOptions};
pub use validation::Operation;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::index::{IndexMap, Indexer};
use crate::keys;
use crate::notify::{CacheEvent, NoopNotifier, Notifier};
use crate::store::LocalStore;
use crate::transport::{Method, ResourceRequest, Transport};
use crate::{DocId, Document, Error};
use validation::{require, validate};

/// Display-only keys stripped from documents before they are sent back.
const EPHEMERAL_KEYS: &[&str] = &["$$hashKey"];

#[derive(Debug, Deserialize)]
struct DocEnvelope {
    #[serde(default)]
    doc: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    docs: Vec<Document>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

fn single_doc(body: Value, operation: Operation) -> Result<Document, Error> {
    let envelope: DocEnvelope =
        serde_json::from_value(body).map_err(|e| Error::MalformedResponse(format!("{operation}: {e}")))?;
    envelope
        .doc
        .ok_or_else(|| Error::MalformedResponse(format!("{operation}: response has no \"doc\"")))
}

/// Cache-aware client for one remote collection.
pub struct ResourceCache {
    options: CacheOptions,
    store: Arc<dyn LocalStore>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    indexer: Indexer,
}

impl ResourceCache {
    /// Create a controller. An empty collection is accepted here; every
    /// operation rejects it until [`set_collection`](Self::set_collection).
    pub fn new(options: CacheOptions, store: Arc<dyn LocalStore>, transport: Arc<dyn Transport>) -> Self {
        Self { options, store, transport, notifier: Arc::new(NoopNotifier), indexer: Indexer::new() }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn collection(&self) -> &str {
        &self.options.collection
    }

    pub fn set_collection(&mut self, collection: impl Into<String>) -> &mut Self {
        self.options.collection = collection.into();
        self
    }

    pub fn domain(&self) -> &str {
        &self.options.domain
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.options.domain = domain.into();
        self
    }

    pub fn doc_caching(&self) -> bool {
        self.options.caching
    }

    pub fn set_doc_caching(&mut self, caching: bool) -> &mut Self {
        self.options.caching = caching;
        self
    }

    /// Forget every index name and secondary value seen so far.
    pub fn init_indexes(&mut self) {
        self.indexer.reset_mut();
    }

    pub async fn index_map(&self) -> IndexMap {
        self.indexer.snapshot().await
    }

    pub fn url_predicate(&self) -> String {
        keys::url_predicate(&self.options.domain, &self.options.collection)
    }

    pub fn cache_key(&self) -> String {
        keys::cache_key(&self.options.domain, &self.options.collection)
    }

    pub fn channel(&self) -> String {
        keys::channel_name(&self.options.domain, &self.options.collection)
    }

    fn collection_path(&self) -> String {
        format!("/{}", self.url_predicate())
    }

    fn resource_request(&self, method: Method, id: &DocId) -> ResourceRequest {
        ResourceRequest::new(method, self.collection_path()).with_resource(id.to_string())
    }

    /// Read one document, from cache when possible.
    pub async fn get(&self, id: impl Into<DocId>, options: GetOptions) -> Result<Document, Error> {
        let id = id.into();
        validate(&self.options.collection, Operation::Get, &[("id", id.is_addressable())])?;

        let key = self.cache_key();
        if !options.ignore_cache
            && let Some(cached) = self.store.get_primary(&key, &id).await?
        {
            tracing::debug!("cache hit for {}/{}", key, id);
            return Ok(cached);
        }

        let body = self
            .send(self.resource_request(Method::Get, &id))
            .await?;
        let doc = single_doc(body, Operation::Get)?;

        self.handle_doc(&doc, None, None).await?;
        self.notifier
            .publish(&self.channel(), CacheEvent::Get { doc: doc.clone() });

        Ok(doc)
    }

    /// List the collection, from cache when the cached list covers the request.
    pub async fn fetch(&self, options: FetchOptions) -> Result<FetchResult, Error> {
        validate(&self.options.collection, Operation::Fetch, &[])?;

        let key = self.cache_key();
        if !options.ignore_cache
            && let Some(cached) = self.store.get_set(&key).await?
            && options.offset.is_none_or(|offset| offset == 0 || offset < cached.len())
        {
            tracing::debug!("cache hit for {} list ({} docs)", key, cached.len());
            return Ok(FetchResult { docs: cached, data: Map::new() });
        }

        let request = ResourceRequest::new(Method::Get, self.collection_path()).with_params(options.query());
        let body = self.send(request).await?;
        let envelope: ListEnvelope =
            serde_json::from_value(body).map_err(|e| Error::MalformedResponse(format!("fetch: {e}")))?;
        let data = envelope.data.unwrap_or_default();

        for doc in &envelope.docs {
            self.handle_doc(doc, options.index.as_deref(), options.secondary.as_deref())
                .await?;
        }

        let cached = self.store.get_set(&key).await?.unwrap_or_default();
        self.notifier.publish(
            &self.channel(),
            CacheEvent::Fetch { docs: cached.clone(), index: options.index.clone(), data: data.clone() },
        );

        let docs = if !self.options.caching || options.ignore_cache { envelope.docs } else { cached };
        Ok(FetchResult { docs, data })
    }

    /// Create a document and cache the server's copy.
    pub async fn create(&self, data: Document) -> Result<Document, Error> {
        validate(&self.options.collection, Operation::Create, &[("data", !data.is_empty())])?;

        let request = ResourceRequest::new(Method::Post, self.collection_path()).with_body(data.into_value());
        let doc = single_doc(self.send(request).await?, Operation::Create)?;

        self.handle_doc(&doc, None, None).await?;
        Ok(doc)
    }

    /// Replace a document and cache the server's copy.
    pub async fn update(&self, mut doc: Document) -> Result<Document, Error> {
        let id = doc.id().filter(DocId::is_addressable);
        let id = require(&self.options.collection, Operation::Update, "doc", id)?;

        for key in EPHEMERAL_KEYS {
            doc.remove(key);
        }

        let request = self.resource_request(Method::Put, &id).with_body(json!({ "doc": doc }));
        let updated = single_doc(self.send(request).await?, Operation::Update)?;

        self.handle_doc(&updated, None, None).await?;
        Ok(updated)
    }

    /// Set a single property and cache the server's copy.
    pub async fn patch(&self, id: impl Into<DocId>, prop: &str, value: Value) -> Result<Document, Error> {
        let id = id.into();
        validate(
            &self.options.collection,
            Operation::Patch,
            &[("id", id.is_addressable()), ("prop", !prop.is_empty()), ("value", !value.is_null())],
        )?;

        let request = self
            .resource_request(Method::Patch, &id)
            .with_body(json!({ "prop": prop, "value": value }));
        let doc = single_doc(self.send(request).await?, Operation::Patch)?;

        self.handle_doc(&doc, None, None).await?;
        Ok(doc)
    }

    /// Delete a document remotely, then drop it from every cached set.
    pub async fn delete(&self, id: impl Into<DocId>) -> Result<bool, Error> {
        let id = id.into();
        validate(&self.options.collection, Operation::Delete, &[("id", id.is_addressable())])?;

        self.send(self.resource_request(Method::Delete, &id)).await?;

        self.handle_removal(&id).await?;
        Ok(true)
    }

    /// Drop everything cached under this controller's cache key and reset
    /// the index map. Never touches the network.
    pub async fn purge(&self) -> Result<(), Error> {
        let key = self.cache_key();
        self.store.clear(&key).await?;
        self.indexer.reset().await;
        tracing::debug!("purged cache for {}", key);
        Ok(())
    }

    /// Cached copy of one document, without network access.
    pub async fn cached(&self, id: impl Into<DocId>) -> Result<Option<Document>, Error> {
        self.store.get_primary(&self.cache_key(), &id.into()).await
    }

    /// Cached default list, without network access.
    pub async fn cached_list(&self) -> Result<Option<Vec<Document>>, Error> {
        self.store.get_set(&self.cache_key()).await
    }

    /// Cached index or secondary index list, without network access.
    pub async fn cached_index(&self, index: &str, secondary: Option<&str>) -> Result<Option<Vec<Document>>, Error> {
        let key = self.cache_key();
        match secondary.filter(|s| !s.is_empty()) {
            Some(secondary) => self.store.get_secondary_index_set(&key, index, secondary).await,
            None => self.store.get_index_set(&key, index).await,
        }
    }

    async fn send(&self, request: ResourceRequest) -> Result<Value, Error> {
        tracing::debug!("{} {}", request.method, request.target());
        self.transport.request(request).await.map_err(|e| {
            tracing::debug!("request failed for {}: {}", self.cache_key(), e);
            Error::from(e)
        })
    }

    async fn handle_doc(&self, doc: &Document, index: Option<&str>, secondary: Option<&str>) -> Result<(), Error> {
        if !self.options.caching {
            return Ok(());
        }
        self.indexer
            .insert(self.store.as_ref(), &self.cache_key(), doc, index, secondary)
            .await
    }

    async fn handle_removal(&self, id: &DocId) -> Result<(), Error> {
        if !self.options.caching || id.is_missing() {
            return Ok(());
        }
        self.indexer.remove(self.store.as_ref(), &self.cache_key(), id).await
    }
}
