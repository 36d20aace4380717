use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MindSparkError, Result};

/// ========================================
/// Proxy request/response wire protocol
/// ========================================

pub const TEXT_REQUIRED: &str = "Text is required";
pub const HEALTH_OK: &str = "Server is running";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Summary,
    Eli5,
    Flashcards,
    Quiz,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Summary, Mode::Eli5, Mode::Flashcards, Mode::Quiz];

    /// Route served by the proxy for this mode.
    pub fn endpoint(self) -> &'static str {
        match self {
            Mode::Summary => "/api/summarize",
            Mode::Eli5 => "/api/eli5",
            Mode::Flashcards => "/api/flashcards",
            Mode::Quiz => "/api/quiz",
        }
    }

    /// Noun used in "Failed to generate <noun>" messages.
    pub fn noun(self) -> &'static str {
        match self {
            Mode::Summary => "summary",
            Mode::Eli5 => "explanation",
            Mode::Flashcards => "flashcards",
            Mode::Quiz => "quiz",
        }
    }

    /// Fixed panel title for the free-text modes.
    pub fn title(self) -> Option<&'static str> {
        match self {
            Mode::Summary => Some("Key Takeaways"),
            Mode::Eli5 => Some("Simply Put"),
            Mode::Flashcards | Mode::Quiz => None,
        }
    }

    pub fn is_text(self) -> bool {
        self.title().is_some()
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Summary => "summary",
            Mode::Eli5 => "eli5",
            Mode::Flashcards => "flashcards",
            Mode::Quiz => "quiz",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correct", alias = "correctIndex")]
    pub correct_index: usize,
}

/// Normalized payload for one generation. Serializes to the bare mode shape
/// (object for text modes, array for flashcards and quiz).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Text(TextResult),
    Flashcards(Vec<Flashcard>),
    Quiz(Vec<QuizQuestion>),
}

impl GenerationResult {
    /// Interpret a proxy success body according to the mode it was requested for.
    pub fn from_value(mode: Mode, value: Value) -> Result<Self> {
        let parsed = match mode {
            Mode::Summary | Mode::Eli5 => serde_json::from_value(value).map(GenerationResult::Text),
            Mode::Flashcards => serde_json::from_value(value).map(GenerationResult::Flashcards),
            Mode::Quiz => serde_json::from_value(value).map(GenerationResult::Quiz),
        };
        parsed.map_err(|e| MindSparkError::Parse(format!("unexpected {} body: {}", mode, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
}

/// Displayable failure of a generation, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    pub message: String,
}

/// What a generation settles into on the client: something to render either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ready(GenerationResult),
    Failed(ErrorResult),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_maps_to_summarize_route() {
        assert_eq!(Mode::Summary.endpoint(), "/api/summarize");
        assert_eq!(Mode::Eli5.endpoint(), "/api/eli5");
    }

    #[test]
    fn quiz_accepts_both_correct_spellings() {
        let a: QuizQuestion = serde_json::from_value(json!({
            "question": "Q?", "options": ["a", "b", "c", "d"], "correct": 2
        }))
        .unwrap();
        let b: QuizQuestion = serde_json::from_value(json!({
            "question": "Q?", "options": ["a", "b", "c", "d"], "correctIndex": 2
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap()["correct"], 2);
    }

    #[test]
    fn result_serializes_to_bare_shape() {
        let cards = GenerationResult::Flashcards(vec![Flashcard { front: "f".into(), back: "b".into() }]);
        assert_eq!(serde_json::to_value(&cards).unwrap(), json!([{ "front": "f", "back": "b" }]));
    }

    #[test]
    fn from_value_rejects_wrong_shape_for_mode() {
        let err = GenerationResult::from_value(Mode::Flashcards, json!({ "title": "t", "content": "c" }));
        assert!(matches!(err, Err(MindSparkError::Parse(_))));
    }
}
