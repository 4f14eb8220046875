//! Session report with JSON export.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerRecord, QuizResults, QuizSettings, Topic};

/// Everything worth keeping from a finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique session identifier.
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `None` if the session never started.
    pub topic: Option<Topic>,
    pub settings: QuizSettings,
    pub results: QuizResults,
    /// Answered questions in order.
    pub answers: Vec<AnswerRecord>,
}

impl SessionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }

    /// Short markdown summary, one line per answer.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let topic = self
            .topic
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "(no topic)".to_string());
        md.push_str(&format!("## Quiz: {topic}\n\n"));
        md.push_str(&format!(
            "Score: {}/{} ({}%), {} wrong\n\n",
            self.results.correct, self.results.total, self.results.percentage, self.results.wrong
        ));

        for (i, answer) in self.answers.iter().enumerate() {
            let mark = if answer.correct { "✓" } else { "✗" };
            let chosen = answer
                .selected
                .and_then(|s| answer.question.options.get(s))
                .map(String::as_str)
                .unwrap_or("(time up)");
            md.push_str(&format!(
                "{}. {mark} {} (answered: {chosen}; correct: {})\n",
                i + 1,
                answer.question.text,
                answer.question.correct_option()
            ));
        }
        md
    }
}
