//! Evaluator trait: turns a draft into a verdict.

use async_trait::async_trait;

use crate::draft::Draft;
use crate::error::Error;
use crate::settings::EvaluationConfig;
use crate::verdict::Verdict;

/// Decides whether a draft may be submitted.
///
/// Well-behaved implementations recover service failures themselves and
/// return a blocking verdict. An `Err` here means the evaluator could not run
/// at all; the gate lets the submission through in that case.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, draft: &Draft, config: &EvaluationConfig) -> Result<Verdict, Error>;
}
