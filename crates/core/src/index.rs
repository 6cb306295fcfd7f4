//! Two-level document indexing.
//!
//! An [`IndexMap`] records, for one controller, every index name it has seen
//! and the secondary values observed under each. The [`Indexer`] writes
//! documents through to a [`LocalStore`] and uses the map to cascade removals
//! across every set a document may have joined.

use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::store::LocalStore;
use crate::{DocId, Document, Error};

/// `index name -> ordered set of secondary values`.
///
/// Index names are created on first use and only disappear on [`clear`].
///
/// [`clear`]: IndexMap::clear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl IndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `index` if it is new.
    pub fn ensure_index(&mut self, index: &str) {
        self.entries.entry(index.to_string()).or_default();
    }

    /// Register `secondary` under `index`, creating the index if needed.
    ///
    /// Returns `true` if the secondary value was not recorded before.
    pub fn record_secondary(&mut self, index: &str, secondary: &str) -> bool {
        let values = self.entries.entry(index.to_string()).or_default();
        if values.iter().any(|v| v == secondary) {
            return false;
        }
        values.push(secondary.to_string());
        true
    }

    pub fn contains_index(&self, index: &str) -> bool {
        self.entries.contains_key(index)
    }

    /// Secondary values recorded under `index`, in first-seen order.
    pub fn secondaries(&self, index: &str) -> &[String] {
        self.entries.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Writes documents into every set they belong to and removes them again.
///
/// The map sits behind a tokio mutex so controller operations can take
/// `&self`; the lock is released before any store call is awaited.
#[derive(Debug, Default)]
pub struct Indexer {
    map: Mutex<IndexMap>,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `doc` into its primary slot and the default set, then into the
    /// `(index, secondary)` set, or the `index` set when only an index is given.
    pub async fn insert(
        &self, store: &dyn LocalStore, key: &str, doc: &Document, index: Option<&str>, secondary: Option<&str>,
    ) -> Result<(), Error> {
        let Some(id) = doc.id() else {
            tracing::warn!("skipping document without id for {}", key);
            return Ok(());
        };

        let index = non_empty(index);
        let secondary = non_empty(secondary);

        {
            let mut map = self.map.lock().await;
            match (index, secondary) {
                (Some(index), Some(secondary)) => {
                    if map.record_secondary(index, secondary) {
                        tracing::debug!("new secondary value {}={} for {}", index, secondary, key);
                    }
                }
                (Some(index), None) => map.ensure_index(index),
                _ => {}
            }
        }

        store.set_primary(key, &id, doc).await?;
        store.add_to_set(key, doc).await?;

        match (index, secondary) {
            (Some(index), Some(secondary)) => {
                store
                    .add_to_secondary_index_set(key, index, secondary, doc)
                    .await?
            }
            (Some(index), None) => store.add_to_index_set(key, index, doc).await?,
            _ => {}
        }

        Ok(())
    }

    /// Remove `id` from the primary slot, the default set, and every index
    /// and secondary index set recorded in the map.
    pub async fn remove(&self, store: &dyn LocalStore, key: &str, id: &DocId) -> Result<(), Error> {
        let map = self.snapshot().await;

        store.clear_primary(key, id).await?;
        store.clear_from_set(key, id).await?;

        for (index, secondaries) in map.iter() {
            store.clear_from_index_set(key, index, id).await?;
            for secondary in secondaries {
                store
                    .clear_from_secondary_index_set(key, index, secondary, id)
                    .await?;
            }
        }

        tracing::debug!("removed {} from {} ({} indexes)", id, key, map.len());
        Ok(())
    }

    /// Copy of the current map.
    pub async fn snapshot(&self) -> IndexMap {
        self.map.lock().await.clone()
    }

    pub async fn reset(&self) {
        self.map.lock().await.clear();
    }

    /// Like [`reset`](Self::reset), for callers holding a unique borrow.
    pub fn reset_mut(&mut self) {
        self.map.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::try_from(value).unwrap()
    }

    #[test]
    fn test_index_map_creation_on_first_use() {
        let mut map = IndexMap::new();
        assert!(!map.contains_index("role"));

        map.ensure_index("role");
        assert!(map.contains_index("role"));
        assert!(map.secondaries("role").is_empty());

        assert!(map.record_secondary("role", "admin"));
        assert!(!map.record_secondary("role", "admin"));
        assert!(map.record_secondary("role", "guest"));
        assert_eq!(map.secondaries("role"), ["admin".to_string(), "guest".to_string()]);

        map.ensure_index("role");
        assert_eq!(map.secondaries("role").len(), 2);
    }

    #[test]
    fn test_index_map_secondary_creates_index() {
        let mut map = IndexMap::new();
        map.record_secondary("team", "red");
        assert!(map.contains_index("team"));
        assert_eq!(map.len(), 1);

        map.clear();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_insert_primary_only() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();
        let d = doc(json!({"id": 1}));

        indexer.insert(&store, "users", &d, None, None).await.unwrap();

        assert_eq!(store.get_primary("users", &DocId::Int(1)).await.unwrap(), Some(d.clone()));
        assert_eq!(store.get_set("users").await.unwrap(), Some(vec![d]));
        assert!(indexer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_with_index() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();
        let d = doc(json!({"id": 1}));

        indexer.insert(&store, "users", &d, Some("active"), None).await.unwrap();

        assert_eq!(store.get_index_set("users", "active").await.unwrap(), Some(vec![d]));
        assert!(indexer.snapshot().await.contains_index("active"));
    }

    #[tokio::test]
    async fn test_empty_index_name_is_ignored() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();

        indexer
            .insert(&store, "users", &doc(json!({"id": 1})), Some(""), Some(""))
            .await
            .unwrap();

        assert!(indexer.snapshot().await.is_empty());
        assert!(store.get_set("users").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_without_id_is_skipped() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();

        indexer
            .insert(&store, "users", &doc(json!({"name": "x"})), Some("role"), None)
            .await
            .unwrap();

        assert!(store.get_set("users").await.unwrap().is_none());
        assert!(indexer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_leaves_sibling_secondary_values() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();
        let admin = doc(json!({"id": 1, "role": "admin"}));
        let guest = doc(json!({"id": 2, "role": "guest"}));

        indexer
            .insert(&store, "users", &admin, Some("role"), Some("admin"))
            .await
            .unwrap();
        indexer
            .insert(&store, "users", &guest, Some("role"), Some("guest"))
            .await
            .unwrap();

        indexer.remove(&store, "users", &DocId::Int(1)).await.unwrap();

        assert!(store.get_primary("users", &DocId::Int(1)).await.unwrap().is_none());
        assert!(
            store
                .get_secondary_index_set("users", "role", "admin")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            store.get_secondary_index_set("users", "role", "guest").await.unwrap(),
            Some(vec![guest.clone()])
        );
        assert_eq!(store.get_set("users").await.unwrap(), Some(vec![guest]));

        let map = indexer.snapshot().await;
        assert_eq!(map.secondaries("role").len(), 2);
    }

    #[tokio::test]
    async fn test_remove_cascades_across_indexes() {
        let store = MemoryStore::new();
        let indexer = Indexer::new();
        let d = doc(json!({"id": "u1"}));

        indexer.insert(&store, "users", &d, Some("active"), None).await.unwrap();
        indexer.insert(&store, "users", &d, Some("team"), Some("red")).await.unwrap();

        indexer.remove(&store, "users", &DocId::from("u1")).await.unwrap();

        assert!(store.get_set("users").await.unwrap().is_none());
        assert!(store.get_index_set("users", "active").await.unwrap().is_none());
        assert!(
            store
                .get_secondary_index_set("users", "team", "red")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_reset() {
        let store = MemoryStore::new();
        let mut indexer = Indexer::new();
        indexer
            .insert(&store, "users", &doc(json!({"id": 1})), Some("role"), None)
            .await
            .unwrap();

        indexer.reset_mut();
        assert!(indexer.snapshot().await.is_empty());

        indexer
            .insert(&store, "users", &doc(json!({"id": 1})), Some("role"), None)
            .await
            .unwrap();
        indexer.reset().await;
        assert!(indexer.snapshot().await.is_empty());
    }
}
