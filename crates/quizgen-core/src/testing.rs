//! Test doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{AnswerOutcome, Progress, Question, QuizResults};
use crate::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, QuizView, TokenUsage};

/// Provider that replays a fixed script of replies.
///
/// With `side_reply` set, only question prompts consume the script and every
/// other prompt (explanations, doubts) gets the side reply.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    side_reply: Option<String>,
    fail_all: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn replies(
        script: impl IntoIterator<Item = Result<&'static str, ProviderError>>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(|r| r.map(String::from)).collect()),
            side_reply: None,
            fail_all: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn quiz(
        questions: impl IntoIterator<Item = Result<&'static str, ProviderError>>,
        side_reply: &str,
    ) -> Self {
        Self {
            side_reply: Some(side_reply.to_string()),
            ..Self::replies(questions)
        }
    }

    pub(crate) fn always_failing() -> Self {
        Self {
            fail_all: true,
            ..Self::replies([])
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if self.fail_all {
            return Err(ProviderError::NetworkError("connection refused".into()).into());
        }

        let is_question = request.prompt.starts_with("Generate a multiple choice question");
        let reply = match &self.side_reply {
            Some(side) if !is_question => Ok(side.clone()),
            _ => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::NetworkError("script exhausted".into()))),
        };

        let content = reply?;
        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage::default(),
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        Vec::new()
    }
}

/// Everything a view was asked to show, in order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shown {
    Setup,
    Question(Question, Progress),
    Answer(AnswerOutcome, bool),
    Timer(u32),
    Explanation(String),
    DoubtAnswer(String),
    Results(QuizResults),
    Notice(String),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub(crate) shown: Vec<Shown>,
}

impl RecordingView {
    pub(crate) fn explanations(&self) -> usize {
        self.shown
            .iter()
            .filter(|s| matches!(s, Shown::Explanation(_)))
            .count()
    }

    pub(crate) fn last(&self) -> Option<&Shown> {
        self.shown.last()
    }
}

impl QuizView for RecordingView {
    fn render_setup(&mut self) {
        self.shown.push(Shown::Setup);
    }

    fn render_question(&mut self, question: &Question, progress: Progress) {
        self.shown.push(Shown::Question(question.clone(), progress));
    }

    fn render_answer(&mut self, outcome: &AnswerOutcome, last: bool) {
        self.shown.push(Shown::Answer(*outcome, last));
    }

    fn render_timer(&mut self, remaining_secs: u32) {
        self.shown.push(Shown::Timer(remaining_secs));
    }

    fn render_explanation(&mut self, explanation: &str) {
        self.shown.push(Shown::Explanation(explanation.to_string()));
    }

    fn render_doubt_answer(&mut self, answer: &str) {
        self.shown.push(Shown::DoubtAnswer(answer.to_string()));
    }

    fn render_results(&mut self, results: &QuizResults) {
        self.shown.push(Shown::Results(*results));
    }

    fn notify(&mut self, message: &str) {
        self.shown.push(Shown::Notice(message.to_string()));
    }
}
