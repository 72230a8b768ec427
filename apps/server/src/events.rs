//! In-process event bus feeding the portal's SSE stream.

use serde::Serialize;
use tokio::sync::broadcast;

pub const APPROVAL_RECORDED: &str = "approval-recorded";
pub const BATCH_APPROVAL_COMPLETE: &str = "batch-approval-complete";

const EVENT_BUS_CAPACITY: usize = 128;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

impl ServerEvent {
    pub fn with_payload(event: &str, payload: serde_json::Value) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { tx }
    }

    /// Publish to whoever is listening; no subscribers is fine.
    pub fn publish(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
