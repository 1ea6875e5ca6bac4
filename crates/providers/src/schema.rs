//! The structured answer requested from the evaluation service.

use postgate_core::Draft;
use postgate_core::error::EvaluationError;
use postgate_core::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Name the schema is registered under in the request.
pub const SCHEMA_NAME: &str = "sendability";

/// Inclusive bounds of the severity score.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// What the service must return for a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendabilityAssessment {
    pub is_sendable: bool,
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub rephrased_text: Option<String>,
}

impl SendabilityAssessment {
    /// Validate an untrusted JSON object against the schema.
    pub fn from_value(value: serde_json::Value) -> Result<Self, EvaluationError> {
        let assessment: Self = serde_json::from_value(value)
            .map_err(|e| EvaluationError::SchemaViolation(e.to_string()))?;

        if !assessment.score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&assessment.score) {
            return Err(EvaluationError::ScoreOutOfRange(assessment.score));
        }

        Ok(assessment)
    }

    pub fn into_verdict(self) -> Verdict {
        Verdict {
            sendable: self.is_sendable,
            reason: self.reason.filter(|r| !r.is_empty()),
            score: Some(self.score),
            rephrased_text: self.rephrased_text.filter(|r| !r.is_empty()),
        }
    }
}

/// JSON Schema sent with the request.
///
/// Strict structured outputs require every property to be listed as required,
/// so the optional fields are nullable instead.
pub fn json_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "isSendable": { "type": "boolean" },
            "score": {
                "type": "number",
                "description": "A score from 0 to 10, where 0 means sendable and 10 means completely blocked"
            },
            "reason": { "type": ["string", "null"] },
            "rephrasedText": { "type": ["string", "null"] }
        },
        "required": ["isSendable", "score", "reason", "rephrasedText"],
        "additionalProperties": false
    })
}

/// The user prompt wrapping a draft.
pub fn evaluation_prompt(draft: &Draft) -> String {
    format!(
        "Evaluate if this message should be blocked. Respond with isSendable=false to block, true to allow. Draft:\n\n{}",
        draft.text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_object() {
        let a = SendabilityAssessment::from_value(json!({"isSendable": true, "score": 0})).unwrap();
        assert!(a.is_sendable);
        assert_eq!(a.reason, None);
    }

    #[test]
    fn accepts_nulls_for_optional_fields() {
        let a = SendabilityAssessment::from_value(json!({
            "isSendable": false, "score": 8, "reason": "tone", "rephrasedText": null
        }))
        .unwrap();
        assert_eq!(a.reason.as_deref(), Some("tone"));
        assert_eq!(a.rephrased_text, None);
    }

    #[test]
    fn rejects_missing_flag() {
        let err = SendabilityAssessment::from_value(json!({"score": 3})).unwrap_err();
        assert!(matches!(err, EvaluationError::SchemaViolation(_)));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(SendabilityAssessment::from_value(json!({"isSendable": "yes", "score": 1})).is_err());
        assert!(SendabilityAssessment::from_value(json!({"isSendable": true, "score": "low"})).is_err());
    }

    #[test]
    fn rejects_score_out_of_range() {
        let err = SendabilityAssessment::from_value(json!({"isSendable": false, "score": 11})).unwrap_err();
        assert!(matches!(err, EvaluationError::ScoreOutOfRange(s) if s == 11.0));
        assert!(SendabilityAssessment::from_value(json!({"isSendable": true, "score": -0.5})).is_err());
    }

    #[test]
    fn boundary_scores_are_valid() {
        assert!(SendabilityAssessment::from_value(json!({"isSendable": true, "score": 0.0})).is_ok());
        assert!(SendabilityAssessment::from_value(json!({"isSendable": false, "score": 10.0})).is_ok());
    }

    #[test]
    fn empty_reason_becomes_none() {
        let verdict = SendabilityAssessment {
            is_sendable: false,
            score: 6.0,
            reason: Some(String::new()),
            rephrased_text: Some("Could you clarify?".into()),
        }
        .into_verdict();
        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.score, Some(6.0));
        assert_eq!(verdict.rephrased_text.as_deref(), Some("Could you clarify?"));
    }

    #[test]
    fn prompt_embeds_draft_after_instruction() {
        let prompt = evaluation_prompt(&Draft::new("rude text"));
        assert!(prompt.starts_with("Evaluate if this message should be blocked."));
        assert!(prompt.ends_with("Draft:\n\nrude text"));
    }

    #[test]
    fn schema_lists_every_field_as_required() {
        let schema = json_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert_eq!(schema["additionalProperties"], false);
    }
}
