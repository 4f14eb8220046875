//! Prompt templates for the three model calls a session makes.

use crate::model::{Question, Topic};

/// Ask for one question on `topic` in the JSON shape [`Question::parse`] accepts.
pub fn question_prompt(topic: &Topic) -> String {
    format!(
        r#"Generate a multiple choice question about {sub_topic} (within {subject}) with 4 options and mark the correct answer. Format the response exactly as follows:
{{
    "question": "The question text here",
    "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
    "correctIndex": correct_option_index_here
}}
correctIndex is the 0-based position of the correct option."#,
        sub_topic = topic.sub_topic,
        subject = topic.subject,
    )
}

/// Ask for a point-wise justification of the correct option and a rebuttal
/// of every other option.
pub fn explanation_prompt(question: &Question) -> String {
    let numbered = question
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| format!("{}. {}", i + 1, opt))
        .collect::<Vec<_>>()
        .join(", ");
    let correct = question.correct_option();

    let rebuttals = question
        .options
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != question.correct_index)
        .map(|(_, opt)| {
            format!("{opt}:\n• Point 1 why it's wrong\n• Point 2 why it's wrong")
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"For this question and its options:
Question: "{text}"
Options: {numbered}
Correct Answer: {correct}

Please provide a point-wise explanation in this exact format:
CORRECT ANSWER ({correct}):
• Point 1 about why it's correct
• Point 2 about why it's correct

WHY OTHER OPTIONS ARE INCORRECT:
{rebuttals}
"#,
        text = question.text,
    )
}

/// Pair the question with the user's follow-up doubt.
pub fn doubt_prompt(doubt: &str, question: &Question) -> String {
    format!(
        r#"Regarding this question:
"{text}"

User's doubt: "{doubt}"

Please provide a clear, detailed explanation addressing this specific doubt in the context of the question.
Focus on factual accuracy and explain in a way that's helpful for students preparing for exams."#,
        text = question.text,
        doubt = doubt.trim(),
    )
}
