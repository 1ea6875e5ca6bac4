//! End-to-end tests for the submission gate.
//!
//! These drive a full page session over an in-memory page: a real `Gate`, the
//! LLM evaluator over a scripted provider, and real settings stores. Every
//! post that "goes out" shows up as a click on the page's post button.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use postgate_config::{FileSettingsStore, InMemorySettings, SelectorConfig, Settings, SettingsStore};
use postgate_core::error::ProviderError;
use postgate_core::provider::{ObjectRequest, ObjectResponse, Provider};
use postgate_core::{GateEvent, ModalView, SettingsProvider, Verdict};
use postgate_gate::{
    Disposition, Element, Gate, GateSnapshot, InMemoryPage, KeyPress, PageEvent, PageSession,
};
use postgate_providers::LlmEvaluator;
use serde_json::json;
use tokio::sync::Notify;

// ── Scripted Provider ────────────────────────────────────────────────────

type Reply = Result<serde_json::Value, ProviderError>;

/// Answers by draft text. Drafts registered with `hold` wait for a release.
struct ScriptedProvider {
    replies: HashMap<String, Reply>,
    holds: HashMap<String, Arc<Notify>>,
    drafts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            holds: HashMap::new(),
            drafts: Mutex::new(Vec::new()),
        }
    }

    fn reply(mut self, draft: &str, reply: Reply) -> Self {
        self.replies.insert(draft.into(), reply);
        self
    }

    fn hold(mut self, draft: &str, release: Arc<Notify>) -> Self {
        self.holds.insert(draft.into(), release);
        self
    }

    fn drafts(&self) -> Vec<String> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate_object(&self, request: ObjectRequest) -> Result<ObjectResponse, ProviderError> {
        let draft = request
            .prompt
            .rsplit("Draft:\n\n")
            .next()
            .unwrap_or_default()
            .to_string();
        self.drafts.lock().unwrap().push(draft.clone());

        if let Some(release) = self.holds.get(&draft) {
            release.notified().await;
        }

        let reply = self
            .replies
            .get(&draft)
            .cloned()
            .unwrap_or_else(|| panic!("ScriptedProvider has no reply for {draft:?}"));
        reply.map(|object| ObjectResponse {
            object,
            model: "gpt-4o-mini-scripted".into(),
            usage: None,
        })
    }
}

fn allow() -> Reply {
    Ok(json!({ "isSendable": true, "score": 0, "reason": null, "rephrasedText": null }))
}

fn block(reason: &str) -> Reply {
    Ok(json!({ "isSendable": false, "score": 8, "reason": reason, "rephrasedText": null }))
}

// ── Harness ──────────────────────────────────────────────────────────────

struct Harness {
    page: Arc<InMemoryPage>,
    session: PageSession,
    composer: Element,
    button: Element,
    provider: Arc<ScriptedProvider>,
}

impl Harness {
    fn new(provider: ScriptedProvider, settings: Arc<dyn SettingsProvider>) -> Self {
        let provider = Arc::new(provider);
        let shared = provider.clone();
        let factory = move |_key: &str| -> Result<Arc<dyn Provider>, ProviderError> {
            Ok(shared.clone())
        };
        let evaluator = Arc::new(LlmEvaluator::new(Arc::new(factory), "gpt-4o-mini"));
        let gate = Arc::new(Gate::new(evaluator, settings));

        let page = Arc::new(InMemoryPage::new());
        let composer = page.add_element(Some("tweetTextarea_0"));
        let button = page.add_element(Some("tweetButtonInline"));
        let session = PageSession::new(page.clone(), SelectorConfig::default(), gate);
        session.start();

        Self {
            page,
            session,
            composer,
            button,
            provider,
        }
    }

    fn configured(provider: ScriptedProvider) -> Self {
        let settings = InMemorySettings::new(Settings::new("Block anything rude.", "sk-test"));
        Self::new(provider, Arc::new(settings))
    }

    fn gate(&self) -> &Arc<Gate> {
        self.session.gate()
    }

    /// Type into the composer and click the post button.
    fn post(&self, text: &str) -> Disposition {
        self.page.set_text(self.composer.id, text);
        self.session.dispatch(&PageEvent::Click {
            path: vec![self.button.clone()],
            trusted: true,
        })
    }

    /// Type into the composer and press Enter.
    fn post_with_enter(&self, text: &str) -> Disposition {
        self.page.set_text(self.composer.id, text);
        self.session.dispatch(&PageEvent::KeyDown {
            key: KeyPress::enter(),
            focused: Some(self.composer.clone()),
            trusted: true,
        })
    }

    fn posted(&self) -> usize {
        self.page.clicks().len()
    }
}

async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_friendly_post_goes_out_once() {
    let h = Harness::configured(ScriptedProvider::new().reply("hello", allow()));

    assert_eq!(h.post("hello"), Disposition::Suppress);
    assert_eq!(h.posted(), 0);
    assert_eq!(h.gate().view(), ModalView::loading());

    settle().await;
    assert_eq!(h.page.clicks(), vec![h.button.id]);
    assert_eq!(h.gate().snapshot(), GateSnapshot::Idle);
    assert_eq!(h.gate().view(), ModalView::hidden());
    assert_eq!(h.provider.drafts(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn e2e_rude_post_waits_for_send_anyway() {
    let h = Harness::configured(ScriptedProvider::new().reply("rude text", block("tone")));

    h.post("rude text");
    settle().await;

    assert_eq!(h.posted(), 0);
    assert_eq!(h.gate().view(), ModalView::blocked(Some("tone".into())));
    match h.gate().snapshot() {
        GateSnapshot::Blocked { draft, verdict, .. } => {
            assert_eq!(draft.text(), "rude text");
            assert_eq!(verdict.score, Some(8.0));
        }
        other => panic!("expected Blocked, got {other:?}"),
    }

    assert!(h.gate().send_anyway());
    assert_eq!(h.posted(), 1);
    assert_eq!(h.gate().snapshot(), GateSnapshot::Idle);

    assert!(!h.gate().send_anyway());
    assert_eq!(h.posted(), 1);
}

#[tokio::test]
async fn e2e_dismissed_post_never_goes_out() {
    let h = Harness::configured(ScriptedProvider::new().reply("rude text", block("tone")));

    h.post_with_enter("rude text");
    settle().await;
    assert!(h.gate().dismiss());

    settle().await;
    assert_eq!(h.posted(), 0);
    assert!(!h.gate().view().open);
}

#[tokio::test]
async fn e2e_service_failure_blocks_with_generic_reason() {
    let h = Harness::configured(
        ScriptedProvider::new().reply("hello", Err(ProviderError::Network("connection reset".into()))),
    );

    h.post("hello");
    settle().await;

    assert_eq!(h.posted(), 0);
    let expected = Verdict::evaluation_error();
    assert_eq!(h.gate().view(), ModalView::blocked(expected.reason.clone()));
    assert_eq!(h.gate().view().reason.as_deref(), Some("Error during evaluation"));

    assert!(h.gate().send_anyway());
    assert_eq!(h.posted(), 1);
}

#[tokio::test]
async fn e2e_second_quick_post_supersedes_first() {
    let release_first = Arc::new(Notify::new());
    let h = Harness::configured(
        ScriptedProvider::new()
            .reply("one", allow())
            .hold("one", release_first.clone())
            .reply("two", allow()),
    );

    h.post("one");
    settle().await;
    assert_eq!(h.provider.drafts(), vec!["one".to_string()]);

    h.post("two");
    settle().await;
    assert_eq!(h.posted(), 1);

    // The first evaluation comes back after it was superseded.
    release_first.notify_one();
    settle().await;
    assert_eq!(h.posted(), 1);
    assert_eq!(h.gate().snapshot(), GateSnapshot::Idle);
}

#[tokio::test]
async fn e2e_back_to_back_posts_evaluate_only_the_latest() {
    let h = Harness::configured(ScriptedProvider::new().reply("two", allow()));

    h.post("one");
    h.post("two");
    settle().await;

    assert_eq!(h.provider.drafts(), vec!["two".to_string()]);
    assert_eq!(h.posted(), 1);
}

#[tokio::test]
async fn e2e_new_post_replaces_blocked_one() {
    let h = Harness::configured(
        ScriptedProvider::new()
            .reply("rude text", block("tone"))
            .reply("kind text", allow()),
    );
    let mut events = h.gate().events().subscribe();

    h.post("rude text");
    settle().await;
    assert!(h.gate().view().awaiting_decision());

    h.post("kind text");
    settle().await;
    assert_eq!(h.posted(), 1);
    assert!(!h.gate().send_anyway());

    let mut superseded = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event.as_ref(), GateEvent::Superseded { .. }) {
            superseded += 1;
        }
    }
    assert_eq!(superseded, 1);
}

#[tokio::test]
async fn e2e_unconfigured_settings_post_without_evaluation() {
    let h = Harness::new(ScriptedProvider::new(), Arc::new(InMemorySettings::default()));

    h.post("anything at all");
    settle().await;

    assert_eq!(h.posted(), 1);
    assert!(h.provider.drafts().is_empty());
}

#[tokio::test]
async fn e2e_replayed_click_is_not_intercepted() {
    let h = Harness::configured(ScriptedProvider::new().reply("hello", allow()));

    h.post("hello");
    settle().await;
    assert_eq!(h.posted(), 1);

    // The browser delivers the replay back to the capture listener.
    let replay = PageEvent::Click {
        path: vec![h.button.clone()],
        trusted: false,
    };
    assert_eq!(h.session.dispatch(&replay), Disposition::Continue);
    settle().await;
    assert_eq!(h.provider.drafts().len(), 1);
}

#[tokio::test]
async fn e2e_event_stream_for_allowed_post() {
    let h = Harness::configured(ScriptedProvider::new().reply("hello", allow()));
    let mut events = h.gate().events().subscribe();

    h.post("hello");
    settle().await;

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(match event.as_ref() {
            GateEvent::AttemptCaptured { .. } => "captured",
            GateEvent::EvaluationStarted { .. } => "started",
            GateEvent::Allowed { evaluated: true, .. } => "allowed",
            _ => "other",
        });
    }
    assert_eq!(kinds, vec!["captured", "started", "allowed"]);
}

#[tokio::test]
async fn e2e_settings_file_is_read_on_each_post() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSettingsStore::new(dir.path().join("settings.json")));
    let h = Harness::new(
        ScriptedProvider::new().reply("second", block("tone")),
        store.clone(),
    );

    h.post("first");
    settle().await;
    assert_eq!(h.posted(), 1);

    store
        .save(Settings::new("Block anything rude.", "sk-test"))
        .await
        .unwrap();

    h.post("second");
    settle().await;
    assert_eq!(h.posted(), 1);
    assert!(h.gate().view().awaiting_decision());
}

#[tokio::test]
async fn e2e_closed_session_ignores_late_result() {
    let release = Arc::new(Notify::new());
    let h = Harness::configured(
        ScriptedProvider::new()
            .reply("hello", allow())
            .hold("hello", release.clone()),
    );

    h.post("hello");
    settle().await;
    h.session.close();

    release.notify_one();
    settle().await;
    assert_eq!(h.posted(), 0);
    assert_eq!(h.session.dispatch(&PageEvent::Mutation), Disposition::Continue);
}
