//! Provider error types.
//!
//! The enum is defined in `quizgen-core` so the tutor's retry loop can
//! classify failures; it is re-exported here for provider implementors.

pub use quizgen_core::error::ProviderError;
