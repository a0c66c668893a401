// Document store backends and the trait the write service talks to

pub mod firestore;
pub mod memory;
pub mod value;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};

use crate::models::{DocumentRef, Fields};

pub use crate::errors::store::StoreError;
pub use firestore::{FirestoreConfig, FirestoreRestStore};
pub use memory::InMemoryStore;

/// Length of generated document ids
pub const AUTO_ID_LENGTH: usize = 20;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a generated id in `collection`
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentRef, StoreError>;

    /// Merge `fields` (keys are dot-separated field paths) into an existing document
    async fn update_document(&self, doc: &DocumentRef, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete_document(&self, doc: &DocumentRef) -> Result<(), StoreError>;
}

/// Generates a random 20 character alphanumeric document id
pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_id_shape() {
        let id = auto_id();
        assert_eq!(id.len(), AUTO_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, auto_id());
    }
}
