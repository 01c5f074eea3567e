//! Error taxonomy for the orchestration layer
//!
//! Almost everything here is "a target was not there". None of these errors
//! are fatal: callers log them and carry on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeckError {
    /// A widget's DOM target (or other render sink) does not exist on this page
    #[error("widget `{widget}` has no target `{target}`")]
    MissingTarget { widget: String, target: String },

    /// Section offsets overlap or are not increasing in declaration order
    #[error("invalid section layout: {0}")]
    InvalidLayout(String),

    #[error("invalid deck config: {0}")]
    Config(String),

    /// Key-value store read/write failure (e.g. localStorage disabled)
    #[error("storage error: {0}")]
    Storage(String),
}

impl DeckError {
    pub fn missing(widget: impl Into<String>, target: impl Into<String>) -> Self {
        DeckError::MissingTarget {
            widget: widget.into(),
            target: target.into(),
        }
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        DeckError::Config(err.to_string())
    }
}

pub type DeckResult<T> = Result<T, DeckError>;
