use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_types::ports::document_store::{
    document_id, Document, DocumentStore, FindOptions, Query, StoreError,
};
use dashmap::DashMap;

/// Process-local store: one id-ordered map per collection.
#[derive(Clone)]
pub struct InMemoryStore {
    pub collections: Arc<DashMap<String, BTreeMap<String, Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        let id = document_id(&doc)?.to_string();
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        query: &Query,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut matched: Vec<Document> = match self.collections.get(collection) {
            Some(docs) => docs.values().filter(|d| query.matches(d)).cloned().collect(),
            None => return Ok(Vec::new()),
        };
        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn save(&self, collection: &str, doc: Document) -> Result<bool, StoreError> {
        let id = document_id(&doc)?.to_string();
        if let Some(mut docs) = self.collections.get_mut(collection) {
            if let Some(slot) = docs.get_mut(&id) {
                *slot = doc;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id));
        Ok(u64::from(removed.is_some()))
    }
}
