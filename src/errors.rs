use thiserror::Error;

use crate::wire::Mode;

#[derive(Error, Debug)]
pub enum MindSparkError {
    #[error("validation error: {0}")] Validation(String),
    #[error("transport error: {0}")] Transport(String),
    #[error("upstream error: {0}")] Upstream(String),
    #[error("parse error: {0}")] Parse(String),
    #[error("storage error: {0}")] Storage(String),
}

impl MindSparkError {
    /// Message shown to the client when a generation for `mode` fails on the proxy.
    /// Parse failures are reported exactly like upstream failures.
    pub fn public_message(&self, mode: Mode) -> String {
        match self {
            MindSparkError::Validation(_) => crate::wire::TEXT_REQUIRED.to_string(),
            _ => format!("Failed to generate {}. Check your API key.", mode.noun()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MindSparkError>;
