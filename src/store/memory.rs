use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::value::{set_path, update_paths};
use super::{auto_id, DocumentStore, StoreError};
use crate::models::{validate_collection_path, DocumentRef, Fields};

/// Document store kept in process memory, keyed by document path
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<HashMap<String, Fields>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_document(&self, doc: &DocumentRef) -> Option<Fields> {
        self.documents.read().await.get(&doc.path()).cloned()
    }

    /// Insert a document under a known id, replacing any existing one
    pub async fn insert_document(&self, doc: &DocumentRef, fields: Fields) {
        self.documents.write().await.insert(doc.path(), fields);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentRef, StoreError> {
        validate_collection_path(collection)?;

        let mut documents = self.documents.write().await;
        let doc = loop {
            let candidate = DocumentRef::new(collection, &auto_id())?;
            if !documents.contains_key(&candidate.path()) {
                break candidate;
            }
        };

        debug!("Adding in-memory document {}", doc);
        documents.insert(doc.path(), fields);
        Ok(doc)
    }

    async fn update_document(&self, doc: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        // Validate every path before touching the stored document
        let paths = update_paths(&fields)?;

        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(&doc.path())
            .ok_or_else(|| StoreError::not_found(doc.path()))?;

        for (segments, value) in paths.iter().zip(fields.values()) {
            set_path(existing, segments, value.clone());
        }

        debug!("Updated in-memory document {}", doc);
        Ok(())
    }

    async fn delete_document(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        if self.documents.write().await.remove(&doc.path()).is_some() {
            debug!("Deleted in-memory document {}", doc);
        }
        Ok(())
    }
}
