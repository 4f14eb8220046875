//! Quiz session: progress counters plus the model calls that feed them.
//!
//! [`Tutor`] owns the provider and turns prompts into questions, explanations
//! and doubt answers, absorbing every failure into a fixed fallback.
//! [`QuizSession`] owns the score and the current question.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::model::{AnswerOutcome, AnswerRecord, Question, QuizResults, QuizSettings, Topic};
use crate::prompts;
use crate::report::SessionReport;
use crate::traits::{GenerateRequest, LlmProvider};

pub const EXPLANATION_FALLBACK: &str = "Failed to load explanation.";
pub const DOUBT_FALLBACK: &str = "Failed to get answer. Please try again.";

/// Configuration for model calls.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Max tokens per reply.
    pub max_tokens: u32,
    /// Sampling temperature; some variety keeps questions from repeating.
    pub temperature: f64,
    /// Extra attempts on transient provider errors.
    pub max_retries: u32,
    /// Initial delay between attempts, doubled after each one.
    pub retry_delay: Duration,
    /// Optional system prompt override.
    pub system_prompt: Option<String>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
            system_prompt: None,
        }
    }
}

/// Cheap-to-clone handle for the model calls of a session.
#[derive(Clone)]
pub struct Tutor {
    provider: Arc<dyn LlmProvider>,
    config: TutorConfig,
}

impl Tutor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: TutorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Generate a question, or the fallback question if anything goes wrong.
    pub async fn generate_question(&self, topic: &Topic) -> Question {
        let content = match self.request(prompts::question_prompt(topic)).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(%topic, "question generation failed: {e:#}");
                return Question::fallback();
            }
        };

        match Question::parse(&content) {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!(%topic, "unparseable question from model: {e}");
                tracing::debug!(response = %content, "raw question response");
                Question::fallback()
            }
        }
    }

    /// Point-wise explanation of `question`, or a fixed failure string.
    pub async fn explain(&self, question: &Question) -> String {
        self.request(prompts::explanation_prompt(question))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("explanation request failed: {e:#}");
                EXPLANATION_FALLBACK.to_string()
            })
    }

    /// Answer a follow-up doubt about `question`, or a fixed failure string.
    pub async fn answer_doubt(&self, doubt: &str, question: &Question) -> String {
        self.request(prompts::doubt_prompt(doubt, question))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("doubt request failed: {e:#}");
                DOUBT_FALLBACK.to_string()
            })
    }

    /// Send one prompt, retrying transient provider errors with exponential backoff.
    async fn request(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: self.config.system_prompt.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;
        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
            }
            match self.provider.generate(&request).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = self.provider.name(),
                        model = %response.model,
                        latency_ms = response.latency_ms,
                        total_tokens = response.token_usage.total_tokens,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "model reply received"
                    );
                    return Ok(response.content);
                }
                Err(e) => {
                    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
                        if provider_error.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_error.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms);
                        }
                    }
                    tracing::debug!(attempt = retry + 1, "provider call failed: {e:#}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
    }
}

/// Progress counters of the running session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub score: u32,
    pub questions_answered: u32,
    pub wrong_answers: u32,
    /// 0 = unlimited.
    pub question_limit: u32,
    /// 0 = untimed.
    pub time_limit_secs: u32,
    pub current_question: Option<Question>,
}

impl SessionState {
    pub fn limit_reached(&self) -> bool {
        self.question_limit > 0 && self.questions_answered >= self.question_limit
    }
}

/// Score keeping and model calls for one quiz.
pub struct QuizSession {
    tutor: Tutor,
    state: SessionState,
    topic: Option<Topic>,
    history: Vec<AnswerRecord>,
    id: Uuid,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn new(tutor: Tutor) -> Self {
        Self {
            tutor,
            state: SessionState::default(),
            topic: None,
            history: Vec::new(),
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    pub fn tutor(&self) -> &Tutor {
        &self.tutor
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Zero the counters and begin a new quiz on `topic`.
    pub fn begin(&mut self, topic: Topic, settings: QuizSettings) {
        self.reset();
        self.state.question_limit = settings.question_limit;
        self.state.time_limit_secs = settings.time_limit_secs;
        self.topic = Some(topic);
    }

    /// Clear everything, including limits and topic.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.topic = None;
        self.history.clear();
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
    }

    pub fn settings(&self) -> QuizSettings {
        QuizSettings {
            time_limit_secs: self.state.time_limit_secs,
            question_limit: self.state.question_limit,
        }
    }

    /// `None` once the question limit is reached; never fails otherwise.
    pub async fn generate_question(&self, topic: &Topic) -> Option<Question> {
        if self.state.limit_reached() {
            return None;
        }
        Some(self.tutor.generate_question(topic).await)
    }

    /// Make `question` the one on screen.
    pub fn set_current_question(&mut self, question: Question) {
        self.state.current_question = Some(question);
    }

    /// Score the current question. `None` means the countdown ran out.
    ///
    /// Returns `None` when there is no current question to score.
    pub fn record_answer(&mut self, selected: Option<usize>) -> Option<AnswerOutcome> {
        let question = self.state.current_question.as_ref()?;
        let is_correct = selected == Some(question.correct_index);

        self.state.questions_answered += 1;
        if is_correct {
            self.state.score += 1;
        } else {
            self.state.wrong_answers += 1;
        }

        self.history.push(AnswerRecord {
            question: question.clone(),
            selected,
            correct: is_correct,
        });

        Some(AnswerOutcome {
            selected,
            correct_index: question.correct_index,
            is_correct,
        })
    }

    pub async fn get_explanation(&self, question: &Question) -> String {
        self.tutor.explain(question).await
    }

    pub async fn ask_doubt(&self, doubt: &str, question: &Question) -> String {
        self.tutor.answer_doubt(doubt, question).await
    }

    pub fn get_results(&self) -> QuizResults {
        QuizResults::new(
            self.state.questions_answered,
            self.state.score,
            self.state.wrong_answers,
        )
    }

    /// Snapshot of the session for export.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            topic: self.topic.clone(),
            settings: self.settings(),
            results: self.get_results(),
            answers: self.history.clone(),
        }
    }
}
