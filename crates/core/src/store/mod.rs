//! Local store contract.
//!
//! A store keeps, per cache key, a by-id primary slot plus any number of
//! ordered document sets:
//!
//! - the default set (every cached document of the namespace)
//! - index sets, one per index name
//! - secondary index sets, one per `(index, secondary)` pair
//!
//! Adding a document whose id is already in a set replaces it in place;
//! otherwise it is appended. An empty set reads back as absent.

pub mod memory;

use async_trait::async_trait;

use crate::{DocId, Document, Error};

pub use memory::MemoryStore;

/// Which document set of a namespace an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetScope<'a> {
    Default,
    Index(&'a str),
    Secondary(&'a str, &'a str),
}

impl SetScope<'_> {
    /// `(index, secondary)` with empty strings for the unscoped parts.
    pub fn parts(&self) -> (&str, &str) {
        match *self {
            SetScope::Default => ("", ""),
            SetScope::Index(index) => (index, ""),
            SetScope::Secondary(index, secondary) => (index, secondary),
        }
    }
}

#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_primary(&self, key: &str, id: &DocId) -> Result<Option<Document>, Error>;

    async fn set_primary(&self, key: &str, id: &DocId, doc: &Document) -> Result<(), Error>;

    async fn clear_primary(&self, key: &str, id: &DocId) -> Result<(), Error>;

    async fn get_scoped(&self, key: &str, scope: SetScope<'_>) -> Result<Option<Vec<Document>>, Error>;

    async fn add_scoped(&self, key: &str, scope: SetScope<'_>, doc: &Document) -> Result<(), Error>;

    async fn clear_scoped(&self, key: &str, scope: SetScope<'_>, id: &DocId) -> Result<(), Error>;

    /// Drop every primary slot and set under `key`.
    async fn clear(&self, key: &str) -> Result<(), Error>;

    async fn get_set(&self, key: &str) -> Result<Option<Vec<Document>>, Error> {
        self.get_scoped(key, SetScope::Default).await
    }

    async fn add_to_set(&self, key: &str, doc: &Document) -> Result<(), Error> {
        self.add_scoped(key, SetScope::Default, doc).await
    }

    async fn clear_from_set(&self, key: &str, id: &DocId) -> Result<(), Error> {
        self.clear_scoped(key, SetScope::Default, id).await
    }

    async fn get_index_set(&self, key: &str, index: &str) -> Result<Option<Vec<Document>>, Error> {
        self.get_scoped(key, SetScope::Index(index)).await
    }

    async fn add_to_index_set(&self, key: &str, index: &str, doc: &Document) -> Result<(), Error> {
        self.add_scoped(key, SetScope::Index(index), doc).await
    }

    async fn clear_from_index_set(&self, key: &str, index: &str, id: &DocId) -> Result<(), Error> {
        self.clear_scoped(key, SetScope::Index(index), id).await
    }

    async fn get_secondary_index_set(
        &self, key: &str, index: &str, secondary: &str,
    ) -> Result<Option<Vec<Document>>, Error> {
        self.get_scoped(key, SetScope::Secondary(index, secondary)).await
    }

    async fn add_to_secondary_index_set(
        &self, key: &str, index: &str, secondary: &str, doc: &Document,
    ) -> Result<(), Error> {
        self.add_scoped(key, SetScope::Secondary(index, secondary), doc).await
    }

    async fn clear_from_secondary_index_set(
        &self, key: &str, index: &str, secondary: &str, id: &DocId,
    ) -> Result<(), Error> {
        self.clear_scoped(key, SetScope::Secondary(index, secondary), id).await
    }
}

/// The id a document is stored under, or an error for id-less documents.
pub(crate) fn require_id(doc: &Document) -> Result<DocId, Error> {
    doc.id()
        .ok_or_else(|| Error::InvalidInput("document has no usable \"id\" field".into()))
}
