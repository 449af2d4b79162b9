//! Error types for interaction preparation.
//!
//! Defines `CoreError` as the primary error type for all operations
//! within `tutor-core`.

use thiserror::Error;

/// Error type for tutor-core operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// An error from the prompt catalog (unknown tag, missing placeholder, ...).
    #[error("Prompt error: {0}")]
    PromptError(#[from] tutor_pm::PromptError),

    /// A configuration error (invalid or unreadable config).
    #[error("Config error: {0}")]
    ConfigError(String),

    /// The interaction itself is unusable (e.g. an empty query).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Retrieval found nothing for a mode that must be grounded in sources.
    ///
    /// Carries the reply to show the student instead of calling the model.
    #[error("No relevant content found for the query")]
    NoRelevantContent { reply: String },
}
