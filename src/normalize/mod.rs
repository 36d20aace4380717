use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::{MindSparkError, Result};
use crate::wire::{Flashcard, GenerationResult, Mode, QuizQuestion, TextResult};

pub const QUIZ_OPTION_COUNT: usize = 4;

fn array_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Greedy: from the first '[' to the last ']' in the text.
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("static regex"))
}

/// Locate the candidate JSON array inside free-form completion text.
pub fn candidate_array_span(text: &str) -> Option<&str> {
    array_span_re().find(text).map(|m| m.as_str())
}

/// Two-stage extraction: parse the candidate span, or the whole body when no
/// span exists. Anything other than a non-empty array is a parse error.
pub fn extract_array(text: &str) -> Result<Vec<Value>> {
    let span = candidate_array_span(text);
    let parsed = match span {
        Some(s) => serde_json::from_str::<Value>(s).ok(),
        None => serde_json::from_str::<Value>(text.trim()).ok(),
    };

    match parsed {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items),
        Some(Value::Array(_)) => Err(MindSparkError::Parse("completion held an empty array".into())),
        Some(other) => Err(MindSparkError::Parse(format!(
            "expected a JSON array, got {}",
            kind_of(&other)
        ))),
        None if span.is_some() => Err(MindSparkError::Parse("bracketed span is not valid JSON".into())),
        None => Err(MindSparkError::Parse("no JSON array found in completion".into())),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn typed_items<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Result<Vec<T>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value(v)
                .map_err(|e| MindSparkError::Parse(format!("{what} #{}: {e}", i + 1)))
        })
        .collect()
}

pub fn validate_flashcards(cards: &[Flashcard]) -> Result<()> {
    for (i, c) in cards.iter().enumerate() {
        if c.front.trim().is_empty() || c.back.trim().is_empty() {
            return Err(MindSparkError::Parse(format!("flashcard #{} has an empty side", i + 1)));
        }
    }
    Ok(())
}

pub fn validate_quiz(questions: &[QuizQuestion]) -> Result<()> {
    for (i, q) in questions.iter().enumerate() {
        let n = i + 1;
        if q.question.trim().is_empty() {
            return Err(MindSparkError::Parse(format!("question #{n} is empty")));
        }
        if q.options.len() != QUIZ_OPTION_COUNT {
            return Err(MindSparkError::Parse(format!(
                "question #{n} has {} options, expected {QUIZ_OPTION_COUNT}",
                q.options.len()
            )));
        }
        if q.correct_index >= QUIZ_OPTION_COUNT {
            return Err(MindSparkError::Parse(format!(
                "question #{n} marks option {} as correct",
                q.correct_index
            )));
        }
    }
    Ok(())
}

/// Shape check for a result that arrived already typed, e.g. a proxy reply.
pub fn validate_result(result: &GenerationResult) -> Result<()> {
    match result {
        GenerationResult::Text(t) if t.content.trim().is_empty() => {
            Err(MindSparkError::Parse("text result has no content".into()))
        }
        GenerationResult::Text(_) => Ok(()),
        GenerationResult::Flashcards(cards) if cards.is_empty() => {
            Err(MindSparkError::Parse("no flashcards in result".into()))
        }
        GenerationResult::Flashcards(cards) => validate_flashcards(cards),
        GenerationResult::Quiz(questions) if questions.is_empty() => {
            Err(MindSparkError::Parse("no questions in result".into()))
        }
        GenerationResult::Quiz(questions) => validate_quiz(questions),
    }
}

/// Turn raw completion text into the fixed result shape for `mode`.
pub fn normalize(mode: Mode, completion: &str) -> Result<GenerationResult> {
    match mode {
        Mode::Summary | Mode::Eli5 => {
            if completion.trim().is_empty() {
                return Err(MindSparkError::Upstream("completion was empty".into()));
            }
            let title = mode.title().unwrap_or_default().to_string();
            Ok(GenerationResult::Text(TextResult { title, content: completion.to_string() }))
        }
        Mode::Flashcards => {
            let cards: Vec<Flashcard> = typed_items(extract_array(completion)?, "flashcard")?;
            validate_flashcards(&cards)?;
            Ok(GenerationResult::Flashcards(cards))
        }
        Mode::Quiz => {
            let questions: Vec<QuizQuestion> = typed_items(extract_array(completion)?, "question")?;
            validate_quiz(&questions)?;
            Ok(GenerationResult::Quiz(questions))
        }
    }
}
