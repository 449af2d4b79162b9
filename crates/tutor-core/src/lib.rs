//! Tutor Core
//!
//! Prepares tutoring prompts for a single student interaction. Sits between
//! a chat-handling service and the prompt catalog in `tutor-pm`.
//!
//! # Architecture
//!
//! - [`TutorEngine`] loads configuration and the prompt catalog once, then
//!   turns each [`Interaction`] into a [`PreparedPrompt`]
//! - [`conversation`] formats message history and retrieved chunks into the
//!   `{conversation_context}` and `{context}` strings
//! - [`TutorConfig`] holds settings from `.tutor/config.yml`

pub mod config;
pub mod conversation;
mod engine;
mod error;

pub use config::{ConversationConfig, PromptsConfig, RetrievalConfig, TutorConfig};
pub use conversation::{ConversationMessage, RetrievedChunk, Role, SourceSummary};
pub use engine::{Interaction, PreparedPrompt, TutorEngine};
pub use error::CoreError;
