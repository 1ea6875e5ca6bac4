//! # PostGate Core
//!
//! Domain types, traits, and error definitions for the PostGate submission gate.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that the gate, the evaluator, and the configuration layer implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the gate is a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping the evaluation backend or settings storage via configuration
//! - Easy testing with scripted evaluators and in-memory settings
//! - Clean dependency graph (all crates depend inward on core)

pub mod draft;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod provider;
pub mod replay;
pub mod settings;
pub mod verdict;
pub mod view;

// Re-export key types at crate root for ergonomics
pub use draft::Draft;
pub use error::{Error, Result};
pub use evaluator::Evaluator;
pub use event::{GateEvent, GateEventBus};
pub use provider::{ObjectRequest, ObjectResponse, Provider, ProviderFactory};
pub use replay::ReplayAction;
pub use settings::{EvaluationConfig, SettingKey, SettingsProvider};
pub use verdict::Verdict;
pub use view::ModalView;
