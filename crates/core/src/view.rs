//! What the presentation layer renders for the gate.

use serde::{Deserialize, Serialize};

pub const LOADING_TITLE: &str = "Checking your post…";
pub const REVIEW_TITLE: &str = "Review before posting";
pub const LOADING_DESCRIPTION: &str = "Analyzing your post with AI…";
pub const REVIEW_DESCRIPTION: &str =
    "This post might not land well. Consider revising for clarity or tone before sending.";

/// Dialog state published by the gate.
///
/// While `loading` the dialog offers no actions; otherwise it offers
/// dismiss and "send anyway".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalView {
    pub open: bool,
    pub loading: bool,
    pub reason: Option<String>,
}

impl ModalView {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        Self {
            open: true,
            loading: true,
            reason: None,
        }
    }

    pub fn blocked(reason: Option<String>) -> Self {
        Self {
            open: true,
            loading: false,
            reason,
        }
    }

    /// True when the user can act on the dialog.
    pub fn awaiting_decision(&self) -> bool {
        self.open && !self.loading
    }

    pub fn title(&self) -> &'static str {
        if self.loading { LOADING_TITLE } else { REVIEW_TITLE }
    }

    pub fn description(&self) -> &'static str {
        if self.loading {
            LOADING_DESCRIPTION
        } else {
            REVIEW_DESCRIPTION
        }
    }
}
