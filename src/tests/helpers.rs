use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::models::{DocumentRef, Fields};
use crate::states::StateTracker;
use crate::store::{DocumentStore, InMemoryStore, StoreError};

/// Event seen by the recording tracker or the scripted store, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Loading,
    Success,
    Error(String),
    Add(String),
    Update(String),
    Delete(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<Event> {
    log.lock().unwrap().clone()
}

/// Tracker that appends every call to a shared log
pub struct RecordingTracker {
    log: EventLog,
}

impl RecordingTracker {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl StateTracker for RecordingTracker {
    fn set_loading(&self) {
        self.log.lock().unwrap().push(Event::Loading);
    }

    fn set_success(&self) {
        self.log.lock().unwrap().push(Event::Success);
    }

    fn set_error(&self, message: &str) {
        self.log.lock().unwrap().push(Event::Error(message.to_string()));
    }
}

/// Store that records calls into the shared log and optionally fails them
pub struct ScriptedStore {
    log: EventLog,
    failure: Option<String>,
    pub last_fields: Mutex<Option<Fields>>,
}

impl ScriptedStore {
    pub fn succeeding(log: EventLog) -> Self {
        Self {
            log,
            failure: None,
            last_fields: Mutex::new(None),
        }
    }

    pub fn failing(log: EventLog, message: &str) -> Self {
        Self {
            log,
            failure: Some(message.to_string()),
            last_fields: Mutex::new(None),
        }
    }

    fn outcome(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Api {
                status: 403,
                code: "PERMISSION_DENIED".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentRef, StoreError> {
        self.log.lock().unwrap().push(Event::Add(collection.to_string()));
        *self.last_fields.lock().unwrap() = Some(fields);
        self.outcome()?;
        DocumentRef::new(collection, "generated-id")
    }

    async fn update_document(&self, doc: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        self.log.lock().unwrap().push(Event::Update(doc.path()));
        *self.last_fields.lock().unwrap() = Some(fields);
        self.outcome()
    }

    async fn delete_document(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        self.log.lock().unwrap().push(Event::Delete(doc.path()));
        self.outcome()
    }
}

/// Memory store whose `add_document` waits for `gate` before completing, so
/// tests can observe state while a write is in flight
pub struct GatedStore {
    pub inner: InMemoryStore,
    pub gate: Arc<Notify>,
}

impl GatedStore {
    pub fn new(gate: Arc<Notify>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            gate,
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentRef, StoreError> {
        self.gate.notified().await;
        self.inner.add_document(collection, fields).await
    }

    async fn update_document(&self, doc: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        self.inner.update_document(doc, fields).await
    }

    async fn delete_document(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        self.inner.delete_document(doc).await
    }
}
