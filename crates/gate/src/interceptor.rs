//! Turns user submit gestures into gate attempts.
//!
//! The interceptor runs at the capture phase, ahead of the host page's own
//! handlers. A matching event is suppressed and replaced by an attempt that
//! carries the composer's text and a replay of the gesture. Replays dispatch
//! untrusted clicks, which the interceptor lets through, so a replay never
//! loops back into the gate.

use std::sync::Arc;

use postgate_config::SelectorConfig;
use postgate_core::{Draft, ReplayAction};
use tracing::{debug, trace, warn};

use crate::gate::Gate;
use crate::host::{Disposition, Element, ElementId, HostPage, KeyPress, PageEvent};
use crate::normalizer::PageNormalizer;

pub struct ActionInterceptor {
    host: Arc<dyn HostPage>,
    selectors: SelectorConfig,
    gate: Arc<Gate>,
    normalizer: PageNormalizer,
}

impl ActionInterceptor {
    pub fn new(host: Arc<dyn HostPage>, selectors: SelectorConfig, gate: Arc<Gate>) -> Self {
        let normalizer = PageNormalizer::new(Arc::clone(&host), selectors.clone())
            .with_event_bus(Arc::clone(gate.events()));
        Self {
            host,
            selectors,
            gate,
            normalizer,
        }
    }

    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }

    pub fn normalizer(&self) -> &PageNormalizer {
        &self.normalizer
    }

    /// Handle one page event and tell the host what to do with it.
    pub fn handle(&self, event: &PageEvent) -> Disposition {
        match event {
            PageEvent::Click { path, trusted } => self.on_click(path, *trusted),
            PageEvent::KeyDown {
                key,
                focused,
                trusted,
            } => self.on_key_down(key, focused.as_ref(), *trusted),
            PageEvent::Mutation => {
                self.normalizer.normalize();
                Disposition::Continue
            }
        }
    }

    /// The composer's current text: text content, then form value, then empty.
    pub fn read_draft(&self) -> Draft {
        let composer = self
            .host
            .query_test_ids(&|id| self.selectors.is_composer(id))
            .into_iter()
            .next();

        let text = composer
            .and_then(|c| {
                self.host
                    .text_content(c.id)
                    .filter(|t| !t.is_empty())
                    .or_else(|| self.host.form_value(c.id))
            })
            .unwrap_or_default();
        Draft::new(text)
    }

    fn on_click(&self, path: &[Element], trusted: bool) -> Disposition {
        let Some(control) = path.iter().find(|el| self.is_submit_control(el)) else {
            return Disposition::Continue;
        };
        if !trusted {
            trace!(control = %control.id, "Synthetic click passed through");
            return Disposition::Continue;
        }

        let host = Arc::clone(&self.host);
        let target = control.id;
        self.capture(ReplayAction::new(move || host.dispatch_click(target)))
    }

    fn on_key_down(&self, key: &KeyPress, focused: Option<&Element>, trusted: bool) -> Disposition {
        if !trusted || !key.is_submit_combo() {
            return Disposition::Continue;
        }
        let in_composer = focused
            .and_then(|el| el.test_id.as_deref())
            .is_some_and(|id| self.selectors.is_composer(id));
        if !in_composer {
            return Disposition::Continue;
        }

        // The control may be re-rendered before the replay runs; look it up then.
        let host = Arc::clone(&self.host);
        let selectors = self.selectors.clone();
        self.capture(ReplayAction::new(move || {
            match first_submit_control(host.as_ref(), &selectors) {
                Some(id) => host.dispatch_click(id),
                None => warn!("No submit control on the page, replay dropped"),
            }
        }))
    }

    /// Hand the attempt to the gate. A disposed gate takes nothing, and the
    /// event then reaches the page untouched.
    fn capture(&self, replay: ReplayAction) -> Disposition {
        if self.gate.is_disposed() {
            trace!("Gate disposed, event passed through");
            return Disposition::Continue;
        }
        let draft = self.read_draft();
        debug!(draft_len = draft.char_len(), "Submission intercepted");
        match self.gate.submit(draft, replay) {
            Some(_) => Disposition::Suppress,
            None => Disposition::Continue,
        }
    }

    fn is_submit_control(&self, element: &Element) -> bool {
        element
            .test_id
            .as_deref()
            .is_some_and(|id| self.selectors.is_submit_control(id))
    }
}

fn first_submit_control(host: &dyn HostPage, selectors: &SelectorConfig) -> Option<ElementId> {
    host.query_test_ids(&|id| selectors.is_submit_control(id))
        .first()
        .map(|el| el.id)
}
