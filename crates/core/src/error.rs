//! Error types for the PostGate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all PostGate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Evaluation errors ---
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    // --- Settings errors ---
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while turning a service response into a verdict.
#[derive(Debug, Clone, Error)]
pub enum EvaluationError {
    #[error("Response does not match the evaluation schema: {0}")]
    SchemaViolation(String),

    #[error("Score {0} is outside the range 0..=10")]
    ScoreOutOfRange(f64),

    #[error("Evaluation task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to write settings to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("{0}")]
    Invalid(String),
}
