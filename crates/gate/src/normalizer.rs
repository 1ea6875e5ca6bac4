//! Keeps the host's submit controls clickable.
//!
//! The host page disables its submit control according to its own
//! validation. If it stayed disabled, no click would ever reach the
//! interceptor, so after every mutation batch the disabled marker is removed
//! again. This has no bearing on whether a submission is allowed.

use std::sync::Arc;

use chrono::Utc;
use postgate_config::SelectorConfig;
use postgate_core::{GateEvent, GateEventBus};
use tracing::trace;

use crate::host::HostPage;

const DISABLED_ATTRIBUTE: &str = "aria-disabled";

pub struct PageNormalizer {
    host: Arc<dyn HostPage>,
    selectors: SelectorConfig,
    events: Option<Arc<GateEventBus>>,
}

impl PageNormalizer {
    pub fn new(host: Arc<dyn HostPage>, selectors: SelectorConfig) -> Self {
        Self {
            host,
            selectors,
            events: None,
        }
    }

    pub fn with_event_bus(mut self, events: Arc<GateEventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Re-enable every current submit control. Returns how many were touched.
    pub fn normalize(&self) -> usize {
        let controls = self
            .host
            .query_test_ids(&|id| self.selectors.is_submit_control(id));

        for control in &controls {
            self.host.remove_attribute(control.id, DISABLED_ATTRIBUTE);
            self.host.set_style(control.id, "cursor", "pointer");
        }

        trace!(controls = controls.len(), "Submit controls normalized");
        if let (Some(events), false) = (&self.events, controls.is_empty()) {
            events.publish(GateEvent::Normalized {
                controls: controls.len(),
                timestamp: Utc::now(),
            });
        }
        controls.len()
    }
}
