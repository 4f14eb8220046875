//! The `quizgen play` command: an interactive quiz on the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use quizgen_core::catalog::Catalog;
use quizgen_core::error::TransitionError;
use quizgen_core::model::{QuizSettings, Topic, OPTION_COUNT};
use quizgen_core::traits::{LlmProvider, QuizView};
use quizgen_core::{Phase, QuizSession, SessionController, SessionEvent, Tutor};
use quizgen_providers::{create_provider, load_config_from, QuizgenConfig};

use crate::commands::topics::resolve_catalog;
use crate::view::TerminalView;

pub struct PlayOptions {
    /// Subject and sub-topic given on the command line.
    pub topic: Option<(String, String)>,
    pub time_limit: Option<u32>,
    pub questions: Option<u32>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
}

pub async fn execute(options: PlayOptions) -> Result<()> {
    let config = load_config_from(options.config.as_deref())?;
    let catalog = resolve_catalog(options.catalog.as_deref().or(config.catalog.as_deref()))?;

    let (provider_name, provider_config) = config.provider(options.provider.as_deref())?;
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(provider_name, provider_config)?);
    let tutor_config = config.tutor_config(options.model.as_deref());
    tracing::info!(provider = provider_name, model = %tutor_config.model, "using model");

    let defaults = session_defaults(&config, &options);

    let session = QuizSession::new(Tutor::new(provider, tutor_config));
    let view = TerminalView::new(catalog.clone(), std::io::stdout());
    let (mut controller, mut events) = SessionController::new(session, view);
    let mut play = Play::new(catalog, defaults, options.transcript);

    match options.topic {
        Some((subject, sub_topic)) => {
            let topic = Topic::new(&subject, &sub_topic);
            if topic.as_ref().is_ok_and(|t| !play.catalog.contains(t)) {
                tracing::warn!(%subject, %sub_topic, "topic is not in the catalog");
            }
            let started = controller.start(&subject, &sub_topic, defaults).await;
            if started.is_err() {
                controller.show_setup();
            }
        }
        None => controller.show_setup(),
    }

    let stdin = BufReader::new(tokio::io::stdin());
    drive(&mut controller, &mut events, stdin, &mut play).await
}

/// Config limits, overridden by `--time-limit` and `--questions`.
fn session_defaults(config: &QuizgenConfig, options: &PlayOptions) -> QuizSettings {
    let mut settings = config.quiz_settings();
    if let Some(secs) = options.time_limit {
        settings.time_limit_secs = secs;
    }
    if let Some(questions) = options.questions {
        settings.question_limit = questions;
    }
    settings
}

/// Feed terminal lines and completed background work into the controller
/// until the user quits or input ends.
pub async fn drive<V, R>(
    controller: &mut SessionController<V>,
    events: &mut UnboundedReceiver<SessionEvent>,
    input: R,
    play: &mut Play,
) -> Result<()>
where
    V: QuizView,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                if play.apply(controller, &line).await == Flow::Quit {
                    break;
                }
            }
            Some(event) = events.recv() => controller.handle(event),
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One line of user input, interpreted for the current phase.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Start {
        subject: String,
        sub_topic: String,
        settings: QuizSettings,
    },
    Answer(usize),
    Next,
    Doubt(String),
    Restart,
    Quit,
    Invalid(String),
}

/// Terminal-side state of the `play` command.
pub struct Play {
    catalog: Catalog,
    defaults: QuizSettings,
    transcript: Option<PathBuf>,
    saved: bool,
}

impl Play {
    pub fn new(catalog: Catalog, defaults: QuizSettings, transcript: Option<PathBuf>) -> Self {
        Self {
            catalog,
            defaults,
            transcript,
            saved: false,
        }
    }

    pub async fn apply<V: QuizView>(
        &mut self,
        controller: &mut SessionController<V>,
        line: &str,
    ) -> Flow {
        let result = match self.parse(controller.phase(), line) {
            Input::Start {
                subject,
                sub_topic,
                settings,
            } => controller.start(&subject, &sub_topic, settings).await,
            Input::Answer(index) => controller.select_answer(index),
            Input::Next => controller.load_next_question().await,
            Input::Doubt(doubt) => controller.ask_doubt(&doubt),
            Input::Restart => {
                controller.restart();
                Ok(())
            }
            Input::Quit => return Flow::Quit,
            Input::Invalid(message) => {
                controller.view_mut().notify(&message);
                Ok(())
            }
        };

        match result {
            // Validation failures were already shown by the controller.
            Ok(()) | Err(TransitionError::Invalid(_)) => {}
            Err(e) => {
                tracing::debug!(phase = ?controller.phase(), "rejected action: {e}");
                controller.view_mut().notify(&e.to_string());
            }
        }

        self.save_transcript(controller);
        Flow::Continue
    }

    fn parse(&self, phase: Phase, line: &str) -> Input {
        let line = line.trim();
        match (phase, line.to_ascii_lowercase().as_str()) {
            (_, "q" | "quit") => return Input::Quit,
            (Phase::AwaitingAnswer | Phase::Answered | Phase::Results, "r" | "restart") => {
                return Input::Restart
            }
            _ => {}
        }

        match phase {
            Phase::Setup => self.parse_setup(line),
            Phase::AwaitingAnswer => parse_option(line).map_or_else(
                || Input::Invalid("Answer with A-D or 1-4".into()),
                Input::Answer,
            ),
            Phase::Answered => match line.strip_prefix('?') {
                Some(doubt) => Input::Doubt(doubt.trim().to_string()),
                None if line.is_empty() || line.eq_ignore_ascii_case("n") => Input::Next,
                None => Input::Invalid(
                    "Press Enter to continue, `? your doubt` to ask, or r to restart".into(),
                ),
            },
            Phase::Results if line.is_empty() => Input::Quit,
            Phase::Results => Input::Invalid("Press r for a new quiz or q to quit".into()),
        }
    }

    /// `<subject #> <sub-topic #> [seconds] [questions]`, or `Subject/Sub-topic`.
    fn parse_setup(&self, line: &str) -> Input {
        if line.contains('/') {
            let (subject, sub_topic) = line.split_once('/').unwrap_or((line, ""));
            return Input::Start {
                subject: subject.to_string(),
                sub_topic: sub_topic.to_string(),
                settings: self.defaults,
            };
        }

        let numbers: Result<Vec<u32>, _> = line.split_whitespace().map(str::parse).collect();
        let numbers = match numbers {
            Ok(numbers) => numbers,
            Err(_) => return Input::Invalid("Enter numbers from the menu, e.g. `7 1 30 10`".into()),
        };

        match numbers.as_slice() {
            // Blank input reaches the controller, which asks for both fields.
            [] => Input::Start {
                subject: String::new(),
                sub_topic: String::new(),
                settings: self.defaults,
            },
            [_] => Input::Invalid("Please select both subject and sub-topic".into()),
            [subject_no, sub_topic_no, rest @ ..] if rest.len() <= 2 => {
                let Some(topic) = self.catalog.pick(*subject_no as usize, *sub_topic_no as usize)
                else {
                    return Input::Invalid("No such subject or sub-topic in the menu".into());
                };
                Input::Start {
                    subject: topic.subject,
                    sub_topic: topic.sub_topic,
                    settings: QuizSettings {
                        time_limit_secs: rest.first().copied().unwrap_or(self.defaults.time_limit_secs),
                        question_limit: rest.get(1).copied().unwrap_or(self.defaults.question_limit),
                    },
                }
            }
            _ => Input::Invalid("Too many numbers; expected at most four".into()),
        }
    }

    /// Write the transcript once per finished quiz.
    fn save_transcript<V: QuizView>(&mut self, controller: &mut SessionController<V>) {
        if controller.phase() != Phase::Results {
            self.saved = false;
            return;
        }
        if self.saved {
            return;
        }
        self.saved = true;

        let Some(path) = &self.transcript else {
            return;
        };
        let report = controller.session().report();
        let written = if path.extension().is_some_and(|ext| ext == "md") {
            std::fs::write(path, report.to_markdown())
                .with_context(|| format!("failed to write transcript to {}", path.display()))
        } else {
            report.save_json(path)
        };
        match written {
            Ok(()) => controller
                .view_mut()
                .notify(&format!("Transcript saved to {}", path.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to save transcript: {e:#}");
                controller
                    .view_mut()
                    .notify(&format!("Could not save transcript: {e}"));
            }
        }
    }
}

/// `1`-`4` or `a`-`d` into a 0-based option index.
fn parse_option(line: &str) -> Option<usize> {
    let mut chars = line.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let index = match c.to_ascii_lowercase() {
        'a'..='d' => c.to_ascii_lowercase() as usize - 'a' as usize,
        '1'..='9' => c as usize - '1' as usize,
        _ => return None,
    };
    (index < OPTION_COUNT).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgen_core::TutorConfig;
    use quizgen_providers::mock::MockProvider;
    use std::time::Duration;

    fn play() -> Play {
        Play::new(
            Catalog::builtin(),
            QuizSettings {
                time_limit_secs: 0,
                question_limit: 5,
            },
            None,
        )
    }

    fn question_json(correct: usize) -> String {
        format!(
            r#"{{"question": "Which drug?", "options": ["a", "b", "c", "d"], "correctIndex": {correct}}}"#
        )
    }

    #[test]
    fn command_line_limits_override_config() {
        let config = QuizgenConfig {
            time_limit_secs: 30,
            question_limit: 10,
            ..Default::default()
        };
        let mut options = PlayOptions {
            topic: None,
            time_limit: None,
            questions: Some(3),
            provider: None,
            model: None,
            config: None,
            catalog: None,
            transcript: None,
        };
        assert_eq!(
            session_defaults(&config, &options),
            QuizSettings {
                time_limit_secs: 30,
                question_limit: 3
            }
        );

        options.time_limit = Some(0);
        assert_eq!(session_defaults(&config, &options).time_limit_secs, 0);
    }

    #[test]
    fn option_letters_and_digits() {
        assert_eq!(parse_option("1"), Some(0));
        assert_eq!(parse_option("D"), Some(3));
        assert_eq!(parse_option("b"), Some(1));
        assert_eq!(parse_option("5"), None);
        assert_eq!(parse_option("e"), None);
        assert_eq!(parse_option("12"), None);
        assert_eq!(parse_option(""), None);
    }

    #[test]
    fn setup_line_picks_from_catalog() {
        let input = play().parse(Phase::Setup, "7 1 30");
        assert_eq!(
            input,
            Input::Start {
                subject: "Cardiology".into(),
                sub_topic: "Arrhythmias".into(),
                settings: QuizSettings {
                    time_limit_secs: 30,
                    question_limit: 5,
                },
            }
        );
    }

    #[test]
    fn setup_line_by_name() {
        let input = play().parse(Phase::Setup, "Cardiology/Arrhythmias");
        assert!(matches!(input, Input::Start { ref sub_topic, .. } if sub_topic == "Arrhythmias"));
    }

    #[test]
    fn setup_line_errors() {
        let play = play();
        assert!(matches!(play.parse(Phase::Setup, "7"), Input::Invalid(_)));
        assert!(matches!(play.parse(Phase::Setup, "99 1"), Input::Invalid(_)));
        assert!(matches!(play.parse(Phase::Setup, "x y"), Input::Invalid(_)));
        assert!(matches!(play.parse(Phase::Setup, "1 1 1 1 1"), Input::Invalid(_)));
        assert!(matches!(play.parse(Phase::Setup, ""), Input::Start { .. }));
    }

    #[test]
    fn answered_phase_commands() {
        let play = play();
        assert_eq!(play.parse(Phase::Answered, ""), Input::Next);
        assert_eq!(
            play.parse(Phase::Answered, "? why not digoxin"),
            Input::Doubt("why not digoxin".into())
        );
        assert_eq!(play.parse(Phase::Answered, "r"), Input::Restart);
        assert_eq!(play.parse(Phase::Results, "R"), Input::Restart);
        assert_eq!(play.parse(Phase::AwaitingAnswer, "q"), Input::Quit);
        assert_eq!(play.parse(Phase::Setup, "r"), Input::Invalid(
            "Enter numbers from the menu, e.g. `7 1 30 10`".into()
        ));
    }

    #[tokio::test]
    async fn scripted_terminal_session() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("session.json");

        let provider = MockProvider::with_questions([question_json(0), question_json(3)]);
        let tutor = Tutor::new(
            Arc::new(provider),
            TutorConfig {
                retry_delay: Duration::from_millis(1),
                ..Default::default()
            },
        );
        let view = TerminalView::new(Catalog::builtin(), Vec::new());
        let (mut controller, mut events) = SessionController::new(QuizSession::new(tutor), view);
        let mut play = Play::new(Catalog::builtin(), QuizSettings::default(), Some(transcript.clone()));

        controller.show_setup();
        let input: &[u8] = b"7 1 0 2\na\n\n1\n\nq\n";
        drive(&mut controller, &mut events, input, &mut play)
            .await
            .unwrap();

        let results = controller.session().get_results();
        assert_eq!((results.total, results.correct, results.wrong), (2, 1, 1));
        assert_eq!(results.percentage, 50);

        let output = String::from_utf8_lossy(controller.view().output()).into_owned();
        assert!(output.contains("Question 1 of 2"));
        assert!(output.contains("Question 2 of 2"));
        assert!(output.contains("50%"));
        assert!(output.contains("Transcript saved"));

        let saved = quizgen_core::report::SessionReport::load_json(&transcript).unwrap();
        assert_eq!(saved.answers.len(), 2);
        assert_eq!(saved.topic.unwrap().sub_topic, "Arrhythmias");
    }
}
