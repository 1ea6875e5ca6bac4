//! Evaluation backends for PostGate.
//!
//! All providers implement the `postgate_core::Provider` trait. The
//! [`LlmEvaluator`] sits on top of a provider and is what the gate calls.

pub mod evaluator;
pub mod openai_compat;
pub mod schema;

pub use evaluator::LlmEvaluator;
pub use openai_compat::{OpenAiCompatProvider, OpenAiFactory};
pub use schema::SendabilityAssessment;
