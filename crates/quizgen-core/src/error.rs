//! Error types for quizgen.
//!
//! `ProviderError` lives here rather than in `quizgen-providers` so the
//! tutor's retry loop can downcast and classify failures without string
//! matching.

use thiserror::Error;

use crate::controller::Phase;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why a model response could not be turned into a [`Question`](crate::model::Question).
#[derive(Debug, Error)]
pub enum QuestionParseError {
    #[error("response is not a question object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("expected 4 options, got {0}")]
    WrongOptionCount(usize),

    #[error("correct index {0} is outside 0..=3")]
    CorrectIndexOutOfRange(i64),
}

/// User input that cannot start or continue a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select both subject and sub-topic")]
    MissingTopic,

    #[error("Please type a doubt before asking")]
    EmptyDoubt,
}

/// A controller action that was rejected without touching session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("cannot {action} while in {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("option {0} does not exist")]
    NoSuchOption(usize),
}
