//! One gate instance bound to one host page.
//!
//! The host either calls [`PageSession::dispatch`] from its capture-phase
//! listeners, which tells it synchronously whether to suppress the event, or
//! feeds events through a channel into [`PageSession::run`]. Closing the
//! channel tears the session down.

use std::sync::Arc;

use postgate_config::SelectorConfig;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gate::Gate;
use crate::host::{Disposition, HostPage, PageEvent};
use crate::interceptor::ActionInterceptor;

pub struct PageSession {
    id: Uuid,
    interceptor: ActionInterceptor,
}

impl PageSession {
    pub fn new(host: Arc<dyn HostPage>, selectors: SelectorConfig, gate: Arc<Gate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            interceptor: ActionInterceptor::new(host, selectors, gate),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn gate(&self) -> &Arc<Gate> {
        self.interceptor.gate()
    }

    /// Re-enable submit controls already on the page.
    pub fn start(&self) -> usize {
        let controls = self.interceptor.normalizer().normalize();
        info!(session = %self.id, controls, "Page session started");
        controls
    }

    /// Handle one event. Must be called from within a Tokio runtime.
    pub fn dispatch(&self, event: &PageEvent) -> Disposition {
        let disposition = self.interceptor.handle(event);
        if disposition == Disposition::Suppress {
            debug!(session = %self.id, "Event suppressed");
        }
        disposition
    }

    /// Drop anything pending and ignore later evaluation results.
    pub fn close(&self) {
        self.gate().dispose();
        info!(session = %self.id, "Page session closed");
    }

    /// Process events until the sender side is dropped, then close.
    pub async fn run(self, mut events: mpsc::Receiver<PageEvent>) {
        self.start();
        while let Some(event) = events.recv().await {
            self.dispatch(&event);
        }
        self.close();
    }
}
