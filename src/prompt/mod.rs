use serde::{Deserialize, Serialize};

use crate::wire::Mode;

pub const FLASHCARD_COUNT: usize = 4;
pub const QUIZ_QUESTION_COUNT: usize = 2;

const TEMPERATURE: f32 = 0.7;
const TEXT_MAX_TOKENS: u32 = 300;
const STRUCTURED_MAX_TOKENS: u32 = 500;

/// Instruction pair plus sampling knobs handed to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

fn system_summary() -> &'static str {
    "You are a helpful study assistant. Create concise, bullet-point summaries of study notes."
}

fn system_eli5() -> &'static str {
    "You are a helpful study assistant who explains complex topics in simple, easy-to-understand language. Use analogies and simple words."
}

fn system_flashcards() -> &'static str {
    r#"You are a helpful study assistant. Create flashcards in JSON format with "front" (question) and "back" (answer) fields. Return ONLY valid JSON array."#
}

fn system_quiz() -> &'static str {
    r#"You are a helpful study assistant. Create quiz questions in JSON format. Return ONLY valid JSON array with objects containing "question", "options" (array of 4 strings), and "correct" (index of correct answer)."#
}

pub fn user_prompt(mode: Mode, text: &str) -> String {
    match mode {
        Mode::Summary => format!(
            "Please summarize the following text into 3-5 key takeaways as bullet points:\n\n{text}"
        ),
        Mode::Eli5 => format!(
            "Explain the following text as if explaining to a 5-year-old (ELI5). Use simple words and fun analogies:\n\n{text}"
        ),
        Mode::Flashcards => format!(
"Create {FLASHCARD_COUNT} flashcards from the following text. Return ONLY a JSON array like this: [{{\"front\": \"Question 1\", \"back\": \"Answer 1\"}}, ...]

Text:
{text}"
        ),
        Mode::Quiz => format!(
"Create {QUIZ_QUESTION_COUNT} multiple-choice quiz questions from the following text. Return ONLY a JSON array like this: [{{\"question\": \"Q1?\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct\": 0}}, ...]

Text:
{text}"
        ),
    }
}

pub fn system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::Summary => system_summary(),
        Mode::Eli5 => system_eli5(),
        Mode::Flashcards => system_flashcards(),
        Mode::Quiz => system_quiz(),
    }
}

/// Build the mode-specific prompt. The raw user text is embedded untouched.
pub fn build(mode: Mode, text: &str) -> Prompt {
    Prompt {
        system: system_prompt(mode).to_string(),
        user: user_prompt(mode, text),
        temperature: TEMPERATURE,
        max_tokens: if mode.is_text() { TEXT_MAX_TOKENS } else { STRUCTURED_MAX_TOKENS },
    }
}
