//! Core data model types for quizgen.
//!
//! Questions, topics, session limits, and the small value types the
//! controller hands to views.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuestionParseError, ValidationError};
use crate::traits::extract_json_from_markdown;

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

pub const FALLBACK_QUESTION_TEXT: &str = "Failed to load question. Please try again.";
pub const FALLBACK_OPTION_TEXT: &str = "Error";

/// A single multiple-choice question.
///
/// The serde names match the JSON shape the model is asked to produce.
/// Deserializing runs the same checks as [`Question::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: [String; OPTION_COUNT],
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
}

/// Loose shape used while validating a model response.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctIndex", alias = "correct_index")]
    correct_index: i64,
}

impl Question {
    /// Parse a model response into a question.
    ///
    /// Markdown fences and surrounding prose are stripped first.
    pub fn parse(response: &str) -> Result<Self, QuestionParseError> {
        let json = extract_json_from_markdown(response);
        let raw: RawQuestion = serde_json::from_str(&json)?;
        Self::try_from(raw)
    }

    /// The placeholder shown when a question could not be generated.
    ///
    /// It is a valid question: answering index 0 scores as correct.
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_QUESTION_TEXT.to_string(),
            options: std::array::from_fn(|_| FALLBACK_OPTION_TEXT.to_string()),
            correct_index: 0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.text == FALLBACK_QUESTION_TEXT
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionParseError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let text = raw.question.trim().to_string();
        if text.is_empty() {
            return Err(QuestionParseError::EmptyQuestion);
        }
        if !(0..OPTION_COUNT as i64).contains(&raw.correct_index) {
            return Err(QuestionParseError::CorrectIndexOutOfRange(raw.correct_index));
        }
        let options: [String; OPTION_COUNT] = raw
            .options
            .try_into()
            .map_err(|o: Vec<String>| QuestionParseError::WrongOptionCount(o.len()))?;

        Ok(Self {
            text,
            options,
            correct_index: raw.correct_index as usize,
        })
    }
}

/// Subject and sub-topic a session draws its questions from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub subject: String,
    pub sub_topic: String,
}

impl Topic {
    pub fn new(subject: &str, sub_topic: &str) -> Result<Self, ValidationError> {
        let subject = subject.trim();
        let sub_topic = sub_topic.trim();
        if subject.is_empty() || sub_topic.is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        Ok(Self {
            subject: subject.to_string(),
            sub_topic: sub_topic.to_string(),
        })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.sub_topic)
    }
}

impl FromStr for Topic {
    type Err = ValidationError;

    /// Parses `Subject/Sub-topic`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subject, sub_topic) = s.split_once('/').ok_or(ValidationError::MissingTopic)?;
        Topic::new(subject, sub_topic)
    }
}

/// Per-session limits. Zero means "no limit" for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    pub time_limit_secs: u32,
    pub question_limit: u32,
}

/// Position of the current question within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based number of the question on screen.
    pub number: u32,
    /// `None` for unlimited sessions.
    pub limit: Option<u32>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "Question {} of {}", self.number, limit),
            None => write!(f, "Question {} of ∞", self.number),
        }
    }
}

/// What happened when an answer (or a timeout) was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// `None` when the countdown ran out.
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// One answered question, kept for the session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    pub selected: Option<usize>,
    pub correct: bool,
}

/// Final (or running) score of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub percentage: u32,
}

impl QuizResults {
    pub fn new(total: u32, correct: u32, wrong: u32) -> Self {
        Self {
            total,
            correct,
            wrong,
            percentage: percentage(correct, total),
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up; 0 for an empty session.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (correct, total) = (u64::from(correct), u64::from(total));
    ((200 * correct + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_json() {
        let q = Question::parse(
            r#"{"question": "Which drug?", "options": ["A", "B", "C", "D"], "correctIndex": 3}"#,
        )
        .unwrap();
        assert_eq!(q.text, "Which drug?");
        assert_eq!(q.correct_index, 3);
        assert_eq!(q.correct_option(), "D");
    }

    #[test]
    fn parse_fenced_json_with_snake_case_index() {
        let response = "```json\n{\"question\": \"Q\", \"options\": [\"a\", \"b\", \"c\", \"d\"], \"correct_index\": 1}\n```";
        let q = Question::parse(response).unwrap();
        assert_eq!(q.correct_index, 1);
    }

    #[test]
    fn parse_rejects_wrong_option_count() {
        let err = Question::parse(r#"{"question": "Q", "options": ["a", "b"], "correctIndex": 0}"#)
            .unwrap_err();
        assert!(matches!(err, QuestionParseError::WrongOptionCount(2)));
    }

    #[test]
    fn parse_rejects_out_of_range_index() {
        let err = Question::parse(
            r#"{"question": "Q", "options": ["a", "b", "c", "d"], "correctIndex": 4}"#,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionParseError::CorrectIndexOutOfRange(4)));

        let err = Question::parse(
            r#"{"question": "Q", "options": ["a", "b", "c", "d"], "correctIndex": -1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionParseError::CorrectIndexOutOfRange(-1)));
    }

    #[test]
    fn parse_rejects_blank_question_and_garbage() {
        let err = Question::parse(
            r#"{"question": "  ", "options": ["a", "b", "c", "d"], "correctIndex": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionParseError::EmptyQuestion));

        let err = Question::parse("I cannot help with that.").unwrap_err();
        assert!(matches!(err, QuestionParseError::Json(_)));
    }

    #[test]
    fn deserialize_enforces_question_checks() {
        let q: Question = serde_json::from_str(
            r#"{"question": "Q", "options": ["a", "b", "c", "d"], "correctIndex": 2}"#,
        )
        .unwrap();
        assert_eq!(q.correct_option(), "c");

        let err = serde_json::from_str::<Question>(
            r#"{"question": "Q", "options": ["a", "b", "c", "d"], "correctIndex": 9}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("correct index 9"));

        assert!(serde_json::from_str::<Question>(
            r#"{"question": "Q", "options": ["a", "b", "c"], "correctIndex": 0}"#
        )
        .is_err());
    }

    #[test]
    fn serialized_question_loads_back() {
        let q = Question::fallback();
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn fallback_is_uniform() {
        let q = Question::fallback();
        assert!(q.is_fallback());
        assert_eq!(q.correct_index, 0);
        assert!(q.options.iter().all(|o| o == FALLBACK_OPTION_TEXT));
    }

    #[test]
    fn topic_requires_both_parts() {
        assert_eq!(Topic::new("Cardiology", " "), Err(ValidationError::MissingTopic));
        assert_eq!(Topic::new("", "Arrhythmias"), Err(ValidationError::MissingTopic));

        let topic: Topic = "Cardiology/Arrhythmias".parse().unwrap();
        assert_eq!(topic.subject, "Cardiology");
        assert_eq!(topic.sub_topic, "Arrhythmias");
        assert_eq!(topic.to_string(), "Cardiology/Arrhythmias");
        assert!("Cardiology".parse::<Topic>().is_err());
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn progress_display() {
        let limited = Progress { number: 2, limit: Some(10) };
        assert_eq!(limited.to_string(), "Question 2 of 10");
        let open = Progress { number: 7, limit: None };
        assert_eq!(open.to_string(), "Question 7 of ∞");
    }
}
