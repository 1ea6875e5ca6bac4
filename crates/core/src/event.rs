//! Gate events: decoupled observation of what the gate decided.
//!
//! Events are published on every transition. Observers (logging, the CLI,
//! tests) subscribe without touching gate state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All gate events. `attempt` is the generation number of the attempt the
/// event belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GateEvent {
    /// A user submission was intercepted
    AttemptCaptured {
        attempt: u64,
        draft_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// The evaluator was called
    EvaluationStarted {
        attempt: u64,
        timestamp: DateTime<Utc>,
    },

    /// The submission was replayed without a block
    Allowed {
        attempt: u64,
        /// False when evaluation was skipped because settings are incomplete
        evaluated: bool,
        timestamp: DateTime<Utc>,
    },

    /// The submission is held pending the user's decision
    Blocked {
        attempt: u64,
        reason: Option<String>,
        score: Option<f64>,
        timestamp: DateTime<Utc>,
    },

    /// Evaluation could not run; the submission was replayed anyway
    FailedOpen {
        attempt: u64,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The user chose to send a blocked draft
    Overridden {
        attempt: u64,
        timestamp: DateTime<Utc>,
    },

    /// The user closed the dialog; the submission was abandoned
    Dismissed {
        attempt: u64,
        timestamp: DateTime<Utc>,
    },

    /// A newer attempt replaced a pending or held one
    Superseded {
        attempt: u64,
        by: u64,
        timestamp: DateTime<Utc>,
    },

    /// Submit controls were re-enabled after a page mutation
    Normalized {
        controls: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for gate events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct GateEventBus {
    sender: broadcast::Sender<Arc<GateEvent>>,
}

impl GateEventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: GateEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<GateEvent>> {
        self.sender.subscribe()
    }
}

impl Default for GateEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
