//! Mock provider for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizgen_core::error::ProviderError;
use quizgen_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

/// Start of every question-generation prompt.
const QUESTION_PROMPT_MARKER: &str = "Generate a multiple choice question";

/// A mock LLM provider for exercising sessions without real API calls.
///
/// Question prompts are answered from a queue in order; every other prompt
/// is matched against prompt substrings, then falls back to a default reply.
pub struct MockProvider {
    /// Queued replies for question prompts.
    questions: Mutex<VecDeque<String>>,
    /// Map of prompt substring → reply.
    responses: HashMap<String, String>,
    /// Reply when nothing else matches.
    default_response: String,
    /// Fail every call with a network error.
    offline: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock with the given prompt→reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            questions: Mutex::new(VecDeque::new()),
            responses,
            default_response: "No further details.".to_string(),
            offline: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose question prompts are answered from `questions`, in order.
    pub fn with_questions<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: Mutex::new(questions.into_iter().map(Into::into).collect()),
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock that fails every call as if the network were down.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(HashMap::new())
        }
    }

    /// Reply to non-question prompts containing `needle` with `reply`.
    pub fn respond_to(mut self, needle: &str, reply: &str) -> Self {
        self.responses.insert(needle.to_string(), reply.to_string());
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn reply_for(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.starts_with(QUESTION_PROMPT_MARKER) {
            let mut queue = self
                .questions
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(question) = queue.pop_front() {
                return Ok(question);
            }
        }

        Ok(self
            .responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if self.offline {
            return Err(ProviderError::NetworkError("mock provider is offline".into()).into());
        }

        let content = self.reply_for(&request.prompt)?;
        let prompt_tokens = (request.prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Because.");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "Because.");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn questions_are_served_in_order() {
        let provider = MockProvider::with_questions(["first", "second"])
            .respond_to("User's doubt", "doubt reply");

        let prompt = format!("{QUESTION_PROMPT_MARKER} about X");
        assert_eq!(provider.generate(&request(&prompt)).await.unwrap().content, "first");
        assert_eq!(
            provider
                .generate(&request("Regarding this question:\nUser's doubt: \"?\""))
                .await
                .unwrap()
                .content,
            "doubt reply"
        );
        assert_eq!(provider.generate(&request(&prompt)).await.unwrap().content, "second");
        assert_eq!(provider.call_count(), 3);
        assert!(provider.last_request().unwrap().prompt.ends_with("about X"));
    }

    #[tokio::test]
    async fn offline_mock_fails() {
        let provider = MockProvider::offline();
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_some());
    }
}
