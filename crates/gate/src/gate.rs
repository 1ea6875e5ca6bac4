//! The gate state machine.
//!
//! ```text
//!            attempt                    sendable / skipped / failed
//!   Idle ───────────────▶ Evaluating ─────────────────────────────▶ Idle (replay)
//!    ▲                        │
//!    │ dismiss (drop)         │ not sendable
//!    │ send anyway (replay)   ▼
//!    └─────────────────── Blocked
//! ```
//!
//! Any new attempt moves the gate to `Evaluating`, dropping whatever replay
//! was pending. Every attempt gets a generation number; an evaluation that
//! resolves after its generation was superseded is ignored.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use postgate_core::error::{Error, EvaluationError};
use postgate_core::{
    Draft, EvaluationConfig, Evaluator, GateEvent, GateEventBus, ModalView, ReplayAction,
    SettingsProvider, Verdict,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Internal state. The replay lives here so that replacing the state is
/// enough to abandon a superseded attempt.
enum GateState {
    Idle,
    Evaluating {
        draft: Draft,
        replay: ReplayAction,
    },
    Blocked {
        draft: Draft,
        verdict: Verdict,
        replay: ReplayAction,
    },
}

/// A read-only view of the gate, for callers and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GateSnapshot {
    Idle,
    Evaluating { attempt: u64, draft: Draft },
    Blocked { attempt: u64, draft: Draft, verdict: Verdict },
}

struct Inner {
    generation: u64,
    state: GateState,
    disposed: bool,
}

/// How an evaluation ended, before the gate acts on it.
enum Outcome {
    /// Settings incomplete, evaluator not called.
    Skipped,
    /// Superseded before the evaluator was called.
    Stale,
    Judged(Verdict),
    Failed(Error),
}

/// Coordinates interception, evaluation, and the user's override.
pub struct Gate {
    inner: Mutex<Inner>,
    evaluator: Arc<dyn Evaluator>,
    settings: Arc<dyn SettingsProvider>,
    view: watch::Sender<ModalView>,
    events: Arc<GateEventBus>,
}

impl Gate {
    pub fn new(evaluator: Arc<dyn Evaluator>, settings: Arc<dyn SettingsProvider>) -> Self {
        let (view, _) = watch::channel(ModalView::hidden());
        Self {
            inner: Mutex::new(Inner {
                generation: 0,
                state: GateState::Idle,
                disposed: false,
            }),
            evaluator,
            settings,
            view,
            events: Arc::new(GateEventBus::default()),
        }
    }

    /// Share an existing event bus instead of the gate's own.
    pub fn with_event_bus(mut self, events: Arc<GateEventBus>) -> Self {
        self.events = events;
        self
    }

    /// The dialog state, for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<ModalView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> ModalView {
        self.view.borrow().clone()
    }

    pub fn events(&self) -> &Arc<GateEventBus> {
        &self.events
    }

    pub fn snapshot(&self) -> GateSnapshot {
        let inner = self.lock();
        match &inner.state {
            GateState::Idle => GateSnapshot::Idle,
            GateState::Evaluating { draft, .. } => GateSnapshot::Evaluating {
                attempt: inner.generation,
                draft: draft.clone(),
            },
            GateState::Blocked { draft, verdict, .. } => GateSnapshot::Blocked {
                attempt: inner.generation,
                draft: draft.clone(),
                verdict: verdict.clone(),
            },
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Start evaluating a captured attempt.
    ///
    /// Supersedes anything in flight or held. Returns the handle of the task
    /// that will resolve the attempt, or `None` once the gate is disposed.
    pub fn submit(self: &Arc<Self>, draft: Draft, replay: ReplayAction) -> Option<JoinHandle<()>> {
        let (attempt, previous) = {
            let mut inner = self.lock();
            if inner.disposed {
                debug!("Gate disposed, ignoring attempt");
                return None;
            }
            inner.generation += 1;
            let previous = std::mem::replace(
                &mut inner.state,
                GateState::Evaluating {
                    draft: draft.clone(),
                    replay,
                },
            );
            self.view.send_replace(ModalView::loading());
            (inner.generation, previous)
        };

        if !matches!(previous, GateState::Idle) {
            debug!(generation = attempt, superseded = attempt - 1, "Pending submission discarded");
            self.events.publish(GateEvent::Superseded {
                attempt: attempt - 1,
                by: attempt,
                timestamp: Utc::now(),
            });
        }
        drop(previous);

        debug!(generation = attempt, draft_len = draft.char_len(), "Attempt captured");
        self.events.publish(GateEvent::AttemptCaptured {
            attempt,
            draft_chars: draft.char_len(),
            timestamp: Utc::now(),
        });

        let gate = Arc::clone(self);
        Some(tokio::spawn(async move {
            let outcome = gate.evaluate(attempt, draft).await;
            gate.settle(attempt, outcome);
        }))
    }

    /// Close a blocked dialog, abandoning the submission.
    ///
    /// Returns false when nothing was blocked; the waiting dialog cannot be
    /// dismissed.
    pub fn dismiss(&self) -> bool {
        let mut inner = self.lock();
        if !matches!(inner.state, GateState::Blocked { .. }) {
            return false;
        }
        let held = std::mem::replace(&mut inner.state, GateState::Idle);
        let attempt = inner.generation;
        self.view.send_replace(ModalView::hidden());
        drop(inner);
        drop(held);

        info!(generation = attempt, "Blocked submission dismissed");
        self.events.publish(GateEvent::Dismissed {
            attempt,
            timestamp: Utc::now(),
        });
        true
    }

    /// Submit a blocked draft anyway. The held replay runs exactly once.
    pub fn send_anyway(&self) -> bool {
        let mut inner = self.lock();
        if !matches!(inner.state, GateState::Blocked { .. }) {
            return false;
        }
        let GateState::Blocked { replay, .. } = std::mem::replace(&mut inner.state, GateState::Idle)
        else {
            return false;
        };
        let attempt = inner.generation;
        self.view.send_replace(ModalView::hidden());
        drop(inner);

        info!(generation = attempt, "Blocked submission sent anyway");
        self.events.publish(GateEvent::Overridden {
            attempt,
            timestamp: Utc::now(),
        });
        replay.invoke();
        true
    }

    /// End the page session. Pending replays are dropped and later
    /// resolutions and attempts are ignored.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.disposed = true;
        let held = std::mem::replace(&mut inner.state, GateState::Idle);
        self.view.send_replace(ModalView::hidden());
        drop(inner);
        drop(held);
        debug!("Gate disposed");
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, attempt: u64) -> bool {
        let inner = self.lock();
        !inner.disposed && inner.generation == attempt
    }

    async fn evaluate(&self, attempt: u64, draft: Draft) -> Outcome {
        let config = match EvaluationConfig::load(self.settings.as_ref()).await {
            Ok(config) => config,
            Err(e) => return Outcome::Failed(e.into()),
        };

        if !config.is_complete() {
            return Outcome::Skipped;
        }

        if !self.is_current(attempt) {
            return Outcome::Stale;
        }

        self.events.publish(GateEvent::EvaluationStarted {
            attempt,
            timestamp: Utc::now(),
        });

        // Separate task so a panicking evaluator surfaces as a join error.
        let evaluator = Arc::clone(&self.evaluator);
        let task = tokio::spawn(async move { evaluator.evaluate(&draft, &config).await });
        match task.await {
            Ok(Ok(verdict)) => Outcome::Judged(verdict),
            Ok(Err(e)) => Outcome::Failed(e),
            Err(join) => Outcome::Failed(EvaluationError::Aborted(join.to_string()).into()),
        }
    }

    fn settle(&self, attempt: u64, outcome: Outcome) {
        let mut inner = self.lock();
        if inner.disposed || inner.generation != attempt {
            debug!(generation = attempt, current = inner.generation, "Stale evaluation ignored");
            return;
        }
        if matches!(outcome, Outcome::Stale) {
            return;
        }

        if !matches!(inner.state, GateState::Evaluating { .. }) {
            warn!(generation = attempt, "Evaluation resolved outside the evaluating state");
            return;
        }
        let GateState::Evaluating { draft, replay } =
            std::mem::replace(&mut inner.state, GateState::Idle)
        else {
            return;
        };

        match outcome {
            Outcome::Judged(verdict) if !verdict.sendable => {
                info!(
                    generation = attempt,
                    score = ?verdict.score,
                    reason = ?verdict.reason,
                    "Submission blocked"
                );
                self.view
                    .send_replace(ModalView::blocked(verdict.reason.clone()));
                self.events.publish(GateEvent::Blocked {
                    attempt,
                    reason: verdict.reason.clone(),
                    score: verdict.score,
                    timestamp: Utc::now(),
                });
                inner.state = GateState::Blocked {
                    draft,
                    verdict,
                    replay,
                };
            }
            Outcome::Judged(_) => self.release(inner, attempt, replay, true),
            Outcome::Skipped => self.release(inner, attempt, replay, false),
            Outcome::Failed(e) => {
                self.view.send_replace(ModalView::hidden());
                drop(inner);

                error!(generation = attempt, error = %e, "Error during evaluation, letting submission through");
                self.events.publish(GateEvent::FailedOpen {
                    attempt,
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                replay.invoke();
            }
            Outcome::Stale => {}
        }
    }

    /// Close the dialog and let the submission through.
    fn release(&self, inner: MutexGuard<'_, Inner>, attempt: u64, replay: ReplayAction, evaluated: bool) {
        self.view.send_replace(ModalView::hidden());
        drop(inner);

        info!(generation = attempt, evaluated, "Submission allowed");
        self.events.publish(GateEvent::Allowed {
            attempt,
            evaluated,
            timestamp: Utc::now(),
        });
        replay.invoke();
    }
}
