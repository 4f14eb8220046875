//! Line-oriented terminal rendering of a quiz.

use std::io::Write;

use comfy_table::{Cell, Table};

use quizgen_core::catalog::Catalog;
use quizgen_core::model::{AnswerOutcome, Progress, Question, QuizResults};
use quizgen_core::traits::QuizView;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Writes every screen of the quiz to `out` as plain text.
pub struct TerminalView<W> {
    catalog: Catalog,
    out: W,
    current: Option<Question>,
    timer_shown: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(catalog: Catalog, out: W) -> Self {
        Self {
            catalog,
            out,
            current: None,
            timer_shown: false,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            tracing::debug!("terminal write failed: {e}");
        }
    }
}

/// Subject menu with numbered sub-topics.
pub fn catalog_listing(catalog: &Catalog) -> String {
    let mut text = String::new();
    for (i, subject) in catalog.subjects.iter().enumerate() {
        text.push_str(&format!("{:>2}. {}\n", i + 1, subject.name));
        for (j, sub_topic) in subject.sub_topics.iter().enumerate() {
            text.push_str(&format!("      {}. {}\n", j + 1, sub_topic));
        }
    }
    text
}

/// Results summary as a table.
pub fn results_table(results: &QuizResults) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Questions", "Correct", "Wrong", "Score"]);
    table.add_row(vec![
        Cell::new(results.total),
        Cell::new(results.correct),
        Cell::new(results.wrong),
        Cell::new(format!("{}%", results.percentage)),
    ]);
    table
}

impl<W: Write> QuizView for TerminalView<W> {
    fn render_setup(&mut self) {
        self.current = None;
        let listing = catalog_listing(&self.catalog);
        self.write("\n== New quiz ==");
        self.write(listing.trim_end());
        self.write(
            "Enter: <subject #> <sub-topic #> [seconds per question] [number of questions]\n\
             (0 means no limit; q quits)",
        );
    }

    fn render_question(&mut self, question: &Question, progress: Progress) {
        self.write(&format!("\n{progress}"));
        self.write(&question.text);
        for (label, option) in OPTION_LABELS.iter().zip(&question.options) {
            self.write(&format!("  {label}) {option}"));
        }
        self.write("Answer with A-D or 1-4.");
        self.current = Some(question.clone());
        self.timer_shown = false;
    }

    fn render_answer(&mut self, outcome: &AnswerOutcome, last: bool) {
        let Some(question) = self.current.clone() else {
            return;
        };

        let verdict = match outcome.selected {
            None => "Time's up!",
            Some(_) if outcome.is_correct => "Correct!",
            Some(_) => "Wrong.",
        };
        self.write(verdict);

        for (i, (label, option)) in OPTION_LABELS.iter().zip(&question.options).enumerate() {
            let marker = if i == outcome.correct_index {
                "✓"
            } else if outcome.selected == Some(i) {
                "✗"
            } else {
                " "
            };
            self.write(&format!("{marker} {label}) {option}"));
        }

        self.write("Loading explanation...");
        let next = if last { "see results" } else { "next question" };
        self.write(&format!(
            "[Enter] {next}   [? text] ask a doubt   [r] restart"
        ));
    }

    fn render_timer(&mut self, remaining_secs: u32) {
        // Full limit, every ten seconds, then the final countdown.
        if !self.timer_shown || remaining_secs % 10 == 0 || remaining_secs <= 5 {
            self.timer_shown = true;
            self.write(&format!("Time left: {remaining_secs}s"));
        }
    }

    fn render_explanation(&mut self, explanation: &str) {
        self.write("\n-- Explanation --");
        self.write(explanation.trim());
    }

    fn render_doubt_answer(&mut self, answer: &str) {
        self.write("\n-- Answer to your doubt --");
        self.write(answer.trim());
    }

    fn render_results(&mut self, results: &QuizResults) {
        self.current = None;
        let table = results_table(results);
        self.write("\n== Quiz complete ==");
        self.write(&table.to_string());
        self.write(&format!(
            "You got {} of {} right ({}%).",
            results.correct, results.total, results.percentage
        ));
        self.write("[r] new quiz   [q] quit");
    }

    fn notify(&mut self, message: &str) {
        self.write(&format!("! {message}"));
    }
}
