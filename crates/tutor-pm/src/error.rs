//! Error types for the prompt catalog.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    /// An unknown selection tag, or a catalog that cannot serve a selection.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A template references a placeholder absent from the supplied values.
    #[error("Missing placeholder `{placeholder}` for template {template}")]
    MissingPlaceholderError {
        template: String,
        placeholder: String,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
