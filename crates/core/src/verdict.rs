//! Verdict: the outcome of evaluating a draft.

use serde::{Deserialize, Serialize};

/// The reason attached to a verdict whenever the evaluation service could not
/// produce a trustworthy answer.
pub const EVALUATION_ERROR_REASON: &str = "Error during evaluation";

/// Whether a draft may be submitted, and why not.
///
/// Produced once per attempt; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the submission may proceed.
    pub sendable: bool,

    /// Human-readable reason, shown when the draft is blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Severity reported by the service (0 = fine, 10 = completely blocked).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// A suggested rewrite, if the service offered one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rephrased_text: Option<String>,
}

impl Verdict {
    /// An unconditional "send it" verdict.
    pub fn allow() -> Self {
        Self {
            sendable: true,
            reason: None,
            score: None,
            rephrased_text: None,
        }
    }

    /// A block with an optional reason.
    pub fn block(reason: Option<String>) -> Self {
        Self {
            sendable: false,
            reason,
            score: None,
            rephrased_text: None,
        }
    }

    /// The fail-closed verdict returned when the service call itself failed.
    pub fn evaluation_error() -> Self {
        Self::block(Some(EVALUATION_ERROR_REASON.into()))
    }
}
