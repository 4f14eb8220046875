//! Session controller: the quiz state machine.
//!
//! User actions arrive as method calls (`start`, `select_answer`,
//! `load_next_question`, `restart`, `ask_doubt`). Work that completes later
//! (countdown ticks, explanations, doubt answers) comes back as
//! [`SessionEvent`]s on the channel returned by [`SessionController::new`]
//! and is applied with [`SessionController::handle`].
//!
//! Every event carries the [`Ticket`] that was current when the work was
//! started. Restarting or moving to the next question invalidates older
//! tickets, so late replies are dropped instead of rendered.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{TransitionError, ValidationError};
use crate::model::{Progress, QuizSettings, Topic, OPTION_COUNT};
use crate::session::QuizSession;
use crate::timer::Countdown;
use crate::traits::QuizView;

/// Where the quiz currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing subject, sub-topic and limits.
    Setup,
    /// A question is on screen and accepts one answer.
    AwaitingAnswer,
    /// The answer is locked in; explanation and doubts are available.
    Answered,
    /// Final score on screen. Only `restart` leaves this phase.
    Results,
}

/// Identifies the session generation and question an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub question: u64,
}

/// Completion of asynchronous work started by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Tick { ticket: Ticket, remaining: u32 },
    TimeUp { ticket: Ticket },
    Explanation { ticket: Ticket, text: String },
    DoubtAnswer { ticket: Ticket, text: String },
}

impl SessionEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            SessionEvent::Tick { ticket, .. }
            | SessionEvent::TimeUp { ticket }
            | SessionEvent::Explanation { ticket, .. }
            | SessionEvent::DoubtAnswer { ticket, .. } => *ticket,
        }
    }
}

pub struct SessionController<V> {
    session: QuizSession,
    view: V,
    phase: Phase,
    generation: u64,
    question_seq: u64,
    timer: Option<Countdown>,
    events: UnboundedSender<SessionEvent>,
}

impl<V: QuizView> SessionController<V> {
    pub fn new(session: QuizSession, view: V) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session,
            view,
            phase: Phase::Setup,
            generation: 0,
            question_seq: 0,
            timer: None,
            events,
        };
        (controller, rx)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// For messages that do not come from a controller action.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            question: self.question_seq,
        }
    }

    /// Draw the setup screen. Call once before the first `start`.
    pub fn show_setup(&mut self) {
        self.view.render_setup();
    }

    /// Begin a quiz and load its first question.
    ///
    /// A blank subject or sub-topic is rejected without touching the counters.
    pub async fn start(
        &mut self,
        subject: &str,
        sub_topic: &str,
        settings: QuizSettings,
    ) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Setup, "start a quiz")?;

        let topic = match Topic::new(subject, sub_topic) {
            Ok(topic) => topic,
            Err(e) => {
                self.view.notify(&e.to_string());
                return Err(e.into());
            }
        };

        self.cancel_timer();
        self.generation += 1;
        tracing::info!(
            %topic,
            time_limit_secs = settings.time_limit_secs,
            question_limit = settings.question_limit,
            "quiz started"
        );
        self.session.begin(topic, settings);
        self.advance().await;
        Ok(())
    }

    /// The "next" action: another question, or the results once the limit is hit.
    pub async fn load_next_question(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Answered, "load the next question")?;
        self.advance().await;
        Ok(())
    }

    /// Lock in the option at `index` (0-based).
    pub fn select_answer(&mut self, index: usize) -> Result<(), TransitionError> {
        self.expect_phase(Phase::AwaitingAnswer, "select an answer")?;
        if index >= OPTION_COUNT {
            return Err(TransitionError::NoSuchOption(index));
        }
        self.finish_question(Some(index));
        Ok(())
    }

    /// Back to setup from anywhere, dropping counters, timer and in-flight replies.
    pub fn restart(&mut self) {
        self.cancel_timer();
        self.generation += 1;
        self.session.reset();
        self.phase = Phase::Setup;
        self.view.render_setup();
    }

    /// Ask a follow-up question about the answered question.
    ///
    /// Leaves the quiz state alone; the reply arrives as an event.
    pub fn ask_doubt(&mut self, doubt: &str) -> Result<(), TransitionError> {
        self.expect_phase(Phase::Answered, "ask a doubt")?;
        if doubt.trim().is_empty() {
            let e = ValidationError::EmptyDoubt;
            self.view.notify(&e.to_string());
            return Err(e.into());
        }
        let Some(question) = self.session.state().current_question.clone() else {
            return Ok(());
        };

        let tutor = self.session.tutor().clone();
        let ticket = self.ticket();
        let events = self.events.clone();
        let doubt = doubt.trim().to_string();
        tokio::spawn(async move {
            let text = tutor.answer_doubt(&doubt, &question).await;
            let _ = events.send(SessionEvent::DoubtAnswer { ticket, text });
        });
        Ok(())
    }

    /// Apply a completed asynchronous event. Stale events are dropped.
    pub fn handle(&mut self, event: SessionEvent) {
        if event.ticket() != self.ticket() {
            tracing::debug!(?event, "discarding event from a superseded question");
            return;
        }

        match event {
            SessionEvent::Tick { remaining, .. } => {
                if self.phase == Phase::AwaitingAnswer {
                    self.view.render_timer(remaining);
                }
            }
            SessionEvent::TimeUp { .. } => {
                // An answer may have landed after the countdown queued this.
                if self.phase == Phase::AwaitingAnswer {
                    self.timer = None;
                    self.view.render_timer(0);
                    self.finish_question(None);
                }
            }
            SessionEvent::Explanation { text, .. } => {
                if self.phase == Phase::Answered {
                    self.view.render_explanation(&text);
                }
            }
            SessionEvent::DoubtAnswer { text, .. } => {
                if self.phase == Phase::Answered {
                    self.view.render_doubt_answer(&text);
                }
            }
        }
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    async fn advance(&mut self) {
        self.cancel_timer();

        let Some(topic) = self.session.topic().cloned() else {
            self.show_results();
            return;
        };
        let Some(question) = self.session.generate_question(&topic).await else {
            self.show_results();
            return;
        };

        self.question_seq += 1;
        let state = self.session.state();
        let progress = Progress {
            number: state.questions_answered + 1,
            limit: (state.question_limit > 0).then_some(state.question_limit),
        };
        let time_limit = state.time_limit_secs;

        self.view.render_question(&question, progress);
        self.session.set_current_question(question);
        self.phase = Phase::AwaitingAnswer;

        if time_limit > 0 {
            self.view.render_timer(time_limit);
            self.timer = Some(Countdown::start(
                time_limit,
                self.ticket(),
                self.events.clone(),
            ));
        }
    }

    /// Score the current question (`None` = timed out) and fetch its explanation.
    fn finish_question(&mut self, selected: Option<usize>) {
        self.cancel_timer();
        let Some(outcome) = self.session.record_answer(selected) else {
            return;
        };
        self.phase = Phase::Answered;

        let last = self.session.state().limit_reached();
        self.view.render_answer(&outcome, last);

        let Some(question) = self.session.state().current_question.clone() else {
            return;
        };
        let tutor = self.session.tutor().clone();
        let ticket = self.ticket();
        let events = self.events.clone();
        tokio::spawn(async move {
            let text = tutor.explain(&question).await;
            let _ = events.send(SessionEvent::Explanation { ticket, text });
        });
    }

    fn show_results(&mut self) {
        self.cancel_timer();
        self.phase = Phase::Results;
        let results = self.session.get_results();
        tracing::info!(
            total = results.total,
            correct = results.correct,
            wrong = results.wrong,
            percentage = results.percentage,
            "quiz finished"
        );
        self.view.render_results(&results);
    }
}
