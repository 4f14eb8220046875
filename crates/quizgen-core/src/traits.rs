//! Core trait definitions for LLM providers and quiz views.
//!
//! `LlmProvider` is implemented by the `quizgen-providers` crate; `QuizView`
//! is implemented by whatever presentation layer drives the controller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{AnswerOutcome, Progress, Question, QuizResults};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that turn a prompt into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Send a prompt and return the model's reply.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from an LLM generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response content.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

/// System prompt used when the caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced medical educator who writes exam-style multiple-choice questions and explains answers clearly and accurately. When asked for JSON, respond with the JSON object only.";

// ---------------------------------------------------------------------------
// Quiz view trait
// ---------------------------------------------------------------------------

/// Presentation surface driven by the session controller.
///
/// Every method is a pure "show this" call; user actions flow back into the
/// controller through its public methods instead of callbacks.
pub trait QuizView {
    /// Show the setup screen (subject, sub-topic, limits).
    fn render_setup(&mut self);

    /// Show a freshly loaded question with its four selectable options.
    fn render_question(&mut self, question: &Question, progress: Progress);

    /// Lock the options and flag the chosen and correct ones.
    ///
    /// `last` is true when the next action leads to the results view.
    fn render_answer(&mut self, outcome: &AnswerOutcome, last: bool);

    /// Update the countdown display.
    fn render_timer(&mut self, remaining_secs: u32);

    /// Show the explanation panel for the answered question.
    fn render_explanation(&mut self, explanation: &str);

    /// Show the reply to a follow-up doubt.
    fn render_doubt_answer(&mut self, answer: &str);

    /// Show the final score.
    fn render_results(&mut self, results: &QuizResults);

    /// Show a short user-visible message (validation prompts and the like).
    fn notify(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON object from a markdown-formatted LLM response.
///
/// Handles:
/// - A ```json``` block (the first one wins)
/// - A generic ``` block (if no json-tagged block is found)
/// - Prose around a bare object (the span from the first `{` to the last `}`)
/// - Anything else is returned trimmed, for the JSON parser to reject
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block && json_block.is_none() {
                json_block = Some(current_block.clone());
            } else if is_generic_block && generic_block.is_none() {
                generic_block = Some(current_block.clone());
            }
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated responses leave the last fence open
    if in_block && !current_block.is_empty() {
        if is_json_block && json_block.is_none() {
            json_block = Some(current_block);
        } else if is_generic_block && generic_block.is_none() {
            generic_block = Some(current_block);
        }
    }

    if let Some(block) = json_block.or(generic_block) {
        return block.trim().to_string();
    }

    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => response[start..=end].to_string(),
        _ => response.trim().to_string(),
    }
}
