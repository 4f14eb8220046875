//! quizgen-core: Quiz session state machine, prompts, and response parsing.
//!
//! This crate defines the data model, the `LlmProvider` and `QuizView`
//! traits, and the session logic that every front-end builds on.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod model;
pub mod prompts;
pub mod report;
pub mod session;
pub mod timer;
pub mod traits;

#[cfg(test)]
mod testing;

pub use controller::{Phase, SessionController, SessionEvent};
pub use session::{QuizSession, Tutor, TutorConfig};
