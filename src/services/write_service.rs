use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, info};

use crate::errors::WriteError;
use crate::models::{DocumentRef, Fields};
use crate::states::{StateTracker, StatesService};
use crate::store::{DocumentStore, StoreError};

/// Writes records of type `T` to a document store and mirrors the progress
/// of every operation into the state tracker `S`.
pub struct WriteService<T, S = StatesService> {
    store: Arc<dyn DocumentStore>,
    states: S,
    _record: PhantomData<fn(&T)>,
}

impl<T, S: Clone> Clone for WriteService<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            states: self.states.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Serialize, S: StateTracker> WriteService<T, S> {
    pub fn new(store: Arc<dyn DocumentStore>, states: S) -> Self {
        Self {
            store,
            states,
            _record: PhantomData,
        }
    }

    /// The state tracker this service reports to
    pub fn states(&self) -> &S {
        &self.states
    }

    /// Create a document in `collection` and return its generated id
    pub async fn create_document(&self, collection: &str, data: &T) -> Result<String, WriteError> {
        self.states.set_loading();

        let result = async {
            let fields = to_fields(data)?;
            self.store.add_document(collection, fields).await
        }
        .await;

        match result {
            Ok(doc) => {
                self.states.set_success();
                info!("Created document {}", doc);
                Ok(doc.id)
            }
            Err(e) => Err(self.fail(e, WriteError::create, "create", collection)),
        }
    }

    /// Merge `data` into the existing document `collection/doc_id`
    pub async fn update_document<P>(&self, collection: &str, doc_id: &str, data: &P) -> Result<(), WriteError>
    where
        P: Serialize + ?Sized,
    {
        self.states.set_loading();

        let result = async {
            let doc = DocumentRef::new(collection, doc_id)?;
            let fields = to_fields(data)?;
            self.store.update_document(&doc, fields).await
        }
        .await;

        match result {
            Ok(()) => {
                self.states.set_success();
                info!("Updated document {}/{}", collection, doc_id);
                Ok(())
            }
            Err(e) => Err(self.fail(e, WriteError::update, "update", collection)),
        }
    }

    /// Delete `collection/doc_id`
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> Result<(), WriteError> {
        self.states.set_loading();

        let result = async {
            let doc = DocumentRef::new(collection, doc_id)?;
            self.store.delete_document(&doc).await
        }
        .await;

        match result {
            Ok(()) => {
                self.states.set_success();
                info!("Deleted document {}/{}", collection, doc_id);
                Ok(())
            }
            Err(e) => Err(self.fail(e, WriteError::delete, "delete", collection)),
        }
    }

    fn fail(
        &self,
        e: StoreError,
        wrap: fn(String) -> WriteError,
        operation: &str,
        collection: &str,
    ) -> WriteError {
        let message = e.to_string();
        error!("Failed to {} document in '{}': {}", operation, collection, message);
        self.states.set_error(&message);
        wrap(message)
    }
}

/// Serialize a record into a document field map
fn to_fields<V: Serialize + ?Sized>(data: &V) -> Result<Fields, StoreError> {
    match serde_json::to_value(data)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(StoreError::invalid_data(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
