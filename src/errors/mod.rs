use thiserror::Error;

/// Common trait for all custom error types in the crate
pub trait AppError: std::error::Error + Send + Sync + 'static {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get the error code for frontend handling
    fn error_code(&self) -> &'static str;

    /// Get optional suggested action for the user
    fn suggested_action(&self) -> Option<String> {
        None
    }
}

/// Failure of one of the write operations, carrying the underlying message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("Error creating document: {message}")]
    Create { message: String },

    #[error("Error updating document: {message}")]
    Update { message: String },

    #[error("Error deleting document: {message}")]
    Delete { message: String },
}

impl AppError for WriteError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn error_code(&self) -> &'static str {
        match self {
            WriteError::Create { .. } => "DOCUMENT_CREATE_FAILED",
            WriteError::Update { .. } => "DOCUMENT_UPDATE_FAILED",
            WriteError::Delete { .. } => "DOCUMENT_DELETE_FAILED",
        }
    }
}

impl WriteError {
    pub fn create<S: Into<String>>(message: S) -> Self {
        Self::Create { message: message.into() }
    }

    pub fn update<S: Into<String>>(message: S) -> Self {
        Self::Update { message: message.into() }
    }

    pub fn delete<S: Into<String>>(message: S) -> Self {
        Self::Delete { message: message.into() }
    }

    /// The underlying message, without the operation prefix
    pub fn message(&self) -> &str {
        match self {
            WriteError::Create { message }
            | WriteError::Update { message }
            | WriteError::Delete { message } => message,
        }
    }
}

// Submodules for layer-specific errors
pub mod store;
