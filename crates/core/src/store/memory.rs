//! In-process local store.
//!
//! Share one `MemoryStore` (behind an `Arc`) between controllers to get a
//! process-wide cache; each controller still only touches its own cache key.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LocalStore, SetScope, require_id};
use crate::{DocId, Document, Error};

#[derive(Debug, Default)]
struct Bucket {
    primary: HashMap<String, Document>,
    sets: HashMap<(String, String), Vec<Document>>,
}

fn set_key(scope: SetScope<'_>) -> (String, String) {
    let (index, secondary) = scope.parts();
    (index.to_string(), secondary.to_string())
}

fn same_id(doc: &Document, wanted: &str) -> bool {
    doc.id().is_some_and(|id| id.to_string() == wanted)
}

/// `HashMap`-backed store guarded by a tokio `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cache keys with any stored state.
    pub async fn namespaces(&self) -> usize {
        self.buckets.read().await.len()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_primary(&self, key: &str, id: &DocId) -> Result<Option<Document>, Error> {
        let buckets = self.buckets.read().await;
        Ok(buckets.get(key).and_then(|b| b.primary.get(&id.to_string())).cloned())
    }

    async fn set_primary(&self, key: &str, id: &DocId, doc: &Document) -> Result<(), Error> {
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(key.to_string())
            .or_default()
            .primary
            .insert(id.to_string(), doc.clone());
        Ok(())
    }

    async fn clear_primary(&self, key: &str, id: &DocId) -> Result<(), Error> {
        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.get_mut(key) {
            bucket.primary.remove(&id.to_string());
        }
        Ok(())
    }

    async fn get_scoped(&self, key: &str, scope: SetScope<'_>) -> Result<Option<Vec<Document>>, Error> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(key)
            .and_then(|b| b.sets.get(&set_key(scope)))
            .filter(|docs| !docs.is_empty())
            .cloned())
    }

    async fn add_scoped(&self, key: &str, scope: SetScope<'_>, doc: &Document) -> Result<(), Error> {
        let id = require_id(doc)?;
        let mut buckets = self.buckets.write().await;
        let docs = buckets
            .entry(key.to_string())
            .or_default()
            .sets
            .entry(set_key(scope))
            .or_default();

        let wanted = id.to_string();
        match docs.iter().position(|d| same_id(d, &wanted)) {
            Some(pos) => docs[pos] = doc.clone(),
            None => docs.push(doc.clone()),
        }
        Ok(())
    }

    async fn clear_scoped(&self, key: &str, scope: SetScope<'_>, id: &DocId) -> Result<(), Error> {
        let mut buckets = self.buckets.write().await;
        if let Some(docs) = buckets.get_mut(key).and_then(|b| b.sets.get_mut(&set_key(scope))) {
            let wanted = id.to_string();
            docs.retain(|d| !same_id(d, &wanted));
        }
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), Error> {
        self.buckets.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_primary_roundtrip() {
        let store = MemoryStore::new();
        let d = doc(json!({"id": 1, "name": "a"}));

        store.set_primary("users", &DocId::Int(1), &d).await.unwrap();
        assert_eq!(store.get_primary("users", &DocId::Int(1)).await.unwrap(), Some(d));
        assert!(store.get_primary("admin:users", &DocId::Int(1)).await.unwrap().is_none());

        store.clear_primary("users", &DocId::Int(1)).await.unwrap();
        assert!(store.get_primary("users", &DocId::Int(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_string_and_int_ids_share_slot() {
        let store = MemoryStore::new();
        store
            .set_primary("users", &DocId::Int(5), &doc(json!({"id": 5})))
            .await
            .unwrap();
        assert!(store.get_primary("users", &DocId::from("5")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_replaces_in_place() {
        let store = MemoryStore::new();
        store.add_to_set("users", &doc(json!({"id": 1, "v": "a"}))).await.unwrap();
        store.add_to_set("users", &doc(json!({"id": 2, "v": "b"}))).await.unwrap();
        store.add_to_set("users", &doc(json!({"id": 1, "v": "c"}))).await.unwrap();

        let docs = store.get_set("users").await.unwrap().unwrap();
        assert_eq!(docs, vec![doc(json!({"id": 1, "v": "c"})), doc(json!({"id": 2, "v": "b"}))]);
    }

    #[tokio::test]
    async fn test_empty_set_is_absent() {
        let store = MemoryStore::new();
        assert!(store.get_set("users").await.unwrap().is_none());

        store.add_to_set("users", &doc(json!({"id": 1}))).await.unwrap();
        store.clear_from_set("users", &DocId::Int(1)).await.unwrap();
        assert!(store.get_set("users").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let store = MemoryStore::new();
        let d = doc(json!({"id": 1}));
        store.add_to_index_set("users", "role", &d).await.unwrap();
        store
            .add_to_secondary_index_set("users", "role", "admin", &d)
            .await
            .unwrap();

        assert!(store.get_set("users").await.unwrap().is_none());
        assert_eq!(store.get_index_set("users", "role").await.unwrap(), Some(vec![d.clone()]));

        store
            .clear_from_secondary_index_set("users", "role", "admin", &DocId::Int(1))
            .await
            .unwrap();
        assert!(
            store
                .get_secondary_index_set("users", "role", "admin")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.get_index_set("users", "role").await.unwrap(), Some(vec![d]));
    }

    #[tokio::test]
    async fn test_add_without_id_fails() {
        let store = MemoryStore::new();
        let result = store.add_to_set("users", &doc(json!({"name": "x"}))).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_clear_namespace() {
        let store = MemoryStore::new();
        store.add_to_set("users", &doc(json!({"id": 1}))).await.unwrap();
        store.add_to_set("posts", &doc(json!({"id": 1}))).await.unwrap();

        store.clear("users").await.unwrap();
        assert!(store.get_set("users").await.unwrap().is_none());
        assert!(store.get_set("posts").await.unwrap().is_some());
        assert_eq!(store.namespaces().await, 1);
    }
}
