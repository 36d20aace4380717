//! Pure view models for generation outcomes.
//!
//! Nothing here touches session state. Interactions report what happened
//! through a `RenderEvent` callback and the caller decides what that is worth.

use crate::wire::{ErrorResult, Flashcard, GenerationResult, Outcome, QuizQuestion, TextResult};

pub const ERROR_HEADING: &str = "Error";
pub const ERROR_HINT: &str =
    "Make sure the MindSpark server is running and your API key is configured.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Text(TextPanel),
    Flashcards(FlashcardDeck),
    Quiz(QuizBoard),
    Error(ErrorPanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPanel {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub heading: String,
    pub message: String,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub front: String,
    pub back: String,
    pub face: Face,
}

impl CardView {
    pub fn shown(&self) -> &str {
        match self.face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDeck {
    cards: Vec<CardView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionControl {
    pub label: String,
    pub disabled: bool,
    pub mark: Option<Mark>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGroup {
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionControl>,
    correct: usize,
}

impl QuestionGroup {
    pub fn is_answered(&self) -> bool {
        self.options.iter().any(|o| o.disabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizBoard {
    groups: Vec<QuestionGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub question: usize,
    pub option: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    CardFlipped { card: usize, face: Face },
    OptionSelected(Answer),
}

pub fn render(outcome: &Outcome) -> View {
    match outcome {
        Outcome::Ready(result) => render_result(result),
        Outcome::Failed(err) => View::Error(error_panel(err)),
    }
}

pub fn render_result(result: &GenerationResult) -> View {
    match result {
        GenerationResult::Text(t) => View::Text(text_panel(t)),
        GenerationResult::Flashcards(cards) => View::Flashcards(FlashcardDeck::new(cards)),
        GenerationResult::Quiz(questions) => View::Quiz(QuizBoard::new(questions)),
    }
}

pub fn text_panel(t: &TextResult) -> TextPanel {
    TextPanel { title: t.title.clone(), body: t.content.clone() }
}

pub fn error_panel(err: &ErrorResult) -> ErrorPanel {
    ErrorPanel {
        heading: ERROR_HEADING.to_string(),
        message: err.message.clone(),
        hint: ERROR_HINT.to_string(),
    }
}

impl FlashcardDeck {
    pub fn new(cards: &[Flashcard]) -> Self {
        let cards = cards
            .iter()
            .map(|c| CardView { front: c.front.clone(), back: c.back.clone(), face: Face::Front })
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    /// Turn one card over. Other cards are untouched.
    pub fn flip(&mut self, card: usize, mut on_event: impl FnMut(RenderEvent)) -> Option<&str> {
        let view = self.cards.get_mut(card)?;
        view.face = match view.face {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        };
        on_event(RenderEvent::CardFlipped { card, face: view.face });
        Some(view.shown())
    }
}

impl QuizBoard {
    pub fn new(questions: &[QuizQuestion]) -> Self {
        let groups = questions
            .iter()
            .enumerate()
            .map(|(i, q)| QuestionGroup {
                number: i + 1,
                prompt: q.question.clone(),
                options: q
                    .options
                    .iter()
                    .map(|label| OptionControl { label: label.clone(), disabled: false, mark: None })
                    .collect(),
                correct: q.correct_index,
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[QuestionGroup] {
        &self.groups
    }

    pub fn is_complete(&self) -> bool {
        self.groups.iter().all(QuestionGroup::is_answered)
    }

    /// First answer per question is final: the whole group is disabled and only
    /// the chosen option gets a mark. Selecting in a disabled group is a no-op.
    pub fn select(
        &mut self,
        question: usize,
        option: usize,
        mut on_event: impl FnMut(RenderEvent),
    ) -> Option<Answer> {
        let group = self.groups.get_mut(question)?;
        if option >= group.options.len() || group.options[option].disabled {
            return None;
        }

        for control in &mut group.options {
            control.disabled = true;
            control.mark = None;
        }
        let correct = option == group.correct;
        group.options[option].mark = Some(if correct { Mark::Correct } else { Mark::Wrong });

        let answer = Answer { question, option, correct };
        on_event(RenderEvent::OptionSelected(answer));
        Some(answer)
    }
}
