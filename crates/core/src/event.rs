//! Domain events.
//!
//! The agent subsystem announces what it did — a reply produced, a
//! tool run, the breaker tripping — without knowing who is listening.
//! The server binary subscribes a logger; tests subscribe to assert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything the agent subsystem announces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A chat turn produced a final reply.
    ResponseGenerated {
        conversation_id: String,
        model: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// One tool directive was dispatched.
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The provider circuit breaker moved to open.
    CircuitTripped {
        failure_count: u32,
        timestamp: DateTime<Utc>,
    },
}

/// Fan-out bus for [`DomainEvent`]s over a tokio broadcast channel.
///
/// Publishing never blocks and never fails; with no subscribers the
/// event is simply dropped. Slow subscribers can lag and miss events,
/// which is acceptable for observability traffic.
pub struct EventBus {
    tx: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: DomainEvent) {
        let _ = self.tx.send(Arc::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
