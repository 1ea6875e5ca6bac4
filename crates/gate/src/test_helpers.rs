//! Shared fixtures for the gate's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use postgate_config::{InMemorySettings, Settings};
use postgate_core::{Draft, Error, EvaluationConfig, Evaluator, Verdict};

/// Answers every call with the same verdict and records the drafts it saw.
pub struct ScriptedEvaluator {
    verdict: Verdict,
    drafts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedEvaluator {
    pub fn always(verdict: Verdict) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            drafts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn drafts(&self) -> Vec<String> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn evaluate(&self, draft: &Draft, _config: &EvaluationConfig) -> Result<Verdict, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.drafts.lock().unwrap().push(draft.text().to_string());
        Ok(self.verdict.clone())
    }
}

pub fn configured_settings() -> Arc<InMemorySettings> {
    Arc::new(InMemorySettings::new(Settings::new("Block insults.", "sk-test")))
}
