use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Phase of the most recent write operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProcessState {
    #[default]
    Idle,
    Loading,
    Success,
    Error { message: String },
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Idle => "idle",
            ProcessState::Loading => "loading",
            ProcessState::Success => "success",
            ProcessState::Error { .. } => "error",
        }
    }

    /// Human-readable description of the phase
    pub fn description(&self) -> String {
        match self {
            ProcessState::Idle => "No operation in progress".to_string(),
            ProcessState::Loading => "Operation in progress".to_string(),
            ProcessState::Success => "Operation completed successfully".to_string(),
            ProcessState::Error { message } => format!("Operation failed: {}", message),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ProcessState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProcessState::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProcessState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Receives the progress of write operations
pub trait StateTracker: Send + Sync {
    fn set_loading(&self);
    fn set_success(&self);
    fn set_error(&self, message: &str);
}

/// Shared, observable operation state. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct StatesService {
    sender: Arc<watch::Sender<ProcessState>>,
}

impl StatesService {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ProcessState::Idle);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.sender.subscribe()
    }

    /// Latest state
    pub fn current(&self) -> ProcessState {
        self.sender.borrow().clone()
    }

    pub fn reset(&self) {
        self.replace(ProcessState::Idle);
    }

    fn replace(&self, state: ProcessState) {
        debug!("State -> {}", state.as_str());
        // send_replace succeeds even with no live receivers
        self.sender.send_replace(state);
    }
}

impl Default for StatesService {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker for StatesService {
    fn set_loading(&self) {
        self.replace(ProcessState::Loading);
    }

    fn set_success(&self) {
        self.replace(ProcessState::Success);
    }

    fn set_error(&self, message: &str) {
        self.replace(ProcessState::Error {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let states = StatesService::new();
        assert_eq!(states.current(), ProcessState::Idle);
        assert!(!states.current().is_loading());
    }

    #[test]
    fn test_transitions_without_subscribers() {
        let states = StatesService::new();
        states.set_loading();
        assert!(states.current().is_loading());

        states.set_error("boom");
        assert_eq!(states.current().error_message(), Some("boom"));
        assert_eq!(states.current().description(), "Operation failed: boom");

        states.reset();
        assert_eq!(states.current(), ProcessState::Idle);
    }

    #[test]
    fn test_clones_share_state() {
        let states = StatesService::new();
        let other = states.clone();
        other.set_success();
        assert_eq!(states.current(), ProcessState::Success);
    }

    #[tokio::test]
    async fn test_subscriber_sees_changes() {
        let states = StatesService::new();
        let mut rx = states.subscribe();

        states.set_loading();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ProcessState::Loading);

        states.set_success();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ProcessState::Success);
    }

    #[test]
    fn test_serializes_with_state_tag() {
        let json = serde_json::to_value(ProcessState::Error {
            message: "denied".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "error", "message": "denied"}));
    }
}
