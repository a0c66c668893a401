use thiserror::Error;

use super::AppError;

/// Errors raised by a document store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid document data: {reason}")]
    InvalidData { reason: String },

    #[error("No document to update: {path}")]
    NotFound { path: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl AppError for StoreError {
    fn user_message(&self) -> String {
        match self {
            StoreError::InvalidPath { reason, .. } => format!("Invalid path: {}", reason),
            StoreError::InvalidData { reason } => format!("Invalid document data: {}", reason),
            StoreError::NotFound { .. } => "Document not found".to_string(),
            StoreError::Serialization(_) => "Document could not be serialized".to_string(),
            StoreError::Http(_) => "The document database could not be reached".to_string(),
            StoreError::Api { message, .. } => message.clone(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StoreError::InvalidPath { .. } => "STORE_INVALID_PATH",
            StoreError::InvalidData { .. } => "STORE_INVALID_DATA",
            StoreError::NotFound { .. } => "STORE_NOT_FOUND",
            StoreError::Serialization(_) => "STORE_SERIALIZATION",
            StoreError::Http(_) => "STORE_HTTP",
            StoreError::Api { .. } => "STORE_API",
        }
    }

    fn suggested_action(&self) -> Option<String> {
        match self {
            StoreError::InvalidPath { .. } => Some(
                "Collection paths need an odd number of segments, e.g. 'users' or 'users/u1/posts'"
                    .to_string(),
            ),
            StoreError::Http(_) => Some("Check FIRESTORE_BASE_URL and network connectivity".to_string()),
            _ => None,
        }
    }
}

/// Convenience methods for creating common store errors
impl StoreError {
    pub fn invalid_path<S: Into<String>, R: Into<String>>(path: S, reason: R) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_data<S: Into<String>>(reason: S) -> Self {
        Self::InvalidData { reason: reason.into() }
    }

    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Self::NotFound { path: path.into() }
    }
}
