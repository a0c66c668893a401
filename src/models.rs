use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Field map of a single document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Reference to one document inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    /// Builds a reference, checking both the collection path and the id
    pub fn new(collection: &str, id: &str) -> Result<Self, StoreError> {
        validate_collection_path(collection)?;
        validate_document_id(id)?;

        Ok(Self {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    /// Full slash-separated path of the document
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A collection path has an odd number of non-empty segments
/// (`users`, `users/u1/posts`, ...)
pub fn validate_collection_path(collection: &str) -> Result<(), StoreError> {
    if collection.is_empty() {
        return Err(StoreError::invalid_path(collection, "collection path cannot be empty"));
    }

    let segments: Vec<&str> = collection.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::invalid_path(collection, "collection path contains an empty segment"));
    }

    if segments.len() % 2 == 0 {
        return Err(StoreError::invalid_path(
            collection,
            "collection path must have an odd number of segments",
        ));
    }

    Ok(())
}

pub fn validate_document_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::invalid_path(id, "document id cannot be empty"));
    }
    if id.contains('/') {
        return Err(StoreError::invalid_path(id, "document id cannot contain '/'"));
    }
    if id == "." || id == ".." {
        return Err(StoreError::invalid_path(id, "document id cannot be '.' or '..'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_path() {
        let doc = DocumentRef::new("users/u1/posts", "p1").unwrap();
        assert_eq!(doc.path(), "users/u1/posts/p1");
        assert_eq!(doc.to_string(), "users/u1/posts/p1");
    }

    #[test]
    fn test_rejects_document_path_as_collection() {
        assert!(DocumentRef::new("users/u1", "p1").is_err());
        assert!(DocumentRef::new("", "p1").is_err());
        assert!(DocumentRef::new("users//posts", "p1").is_err());
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert!(DocumentRef::new("users", "").is_err());
        assert!(DocumentRef::new("users", "a/b").is_err());
        assert!(DocumentRef::new("users", "..").is_err());
    }
}
