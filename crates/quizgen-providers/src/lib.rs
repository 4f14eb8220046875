//! quizgen-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Anthropic and OpenAI-compatible
//! APIs, plus a mock for tests, and loads provider configuration.

pub mod anthropic;
pub mod config;
pub mod error;
mod http;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config_from, ProviderConfig, QuizgenConfig};
pub use error::ProviderError;
