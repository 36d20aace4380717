//! MindSpark: a study-aid proxy in front of a language-model API, plus the
//! terminal client that renders its summaries, flashcards and quizzes and
//! keeps a small XP score.

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod log;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod server;
pub mod state;
pub mod ux;
pub mod wire;
