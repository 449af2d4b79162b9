//! Conversation history and retrieved-source formatting.
//!
//! Turns the structured pieces of an interaction into the plain strings the
//! prompt templates expect: `{conversation_context}` from message history,
//! `{context}` from retrieved chunks.

use serde::{Deserialize, Serialize};

use crate::config::{ConversationConfig, RetrievalConfig};

/// Who sent a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    #[serde(other)]
    Unknown,
}

/// One message of prior conversation, as stored by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Renders the last `history_window` messages as labeled lines.
///
/// # Examples
///
/// ```
/// use tutor_core::ConversationConfig;
/// use tutor_core::conversation::{ConversationMessage, Role, format_conversation_context};
///
/// let cfg = ConversationConfig::default();
/// assert_eq!(format_conversation_context(&[], &cfg), "זוהי תחילת השיחה.");
///
/// let history = [
///     ConversationMessage::new(Role::User, "היי"),
///     ConversationMessage::new(Role::Assistant, "שלום, איך אוכל לעזור?"),
/// ];
/// assert_eq!(
///     format_conversation_context(&history, &cfg),
///     "הקשר השיחה הקודמת:\nסטודנט: היי\nמורה: שלום, איך אוכל לעזור?"
/// );
/// ```
pub fn format_conversation_context(
    history: &[ConversationMessage],
    cfg: &ConversationConfig,
) -> String {
    if history.is_empty() || cfg.history_window == 0 {
        return cfg.empty_history.clone();
    }

    let start = history.len().saturating_sub(cfg.history_window);
    let mut lines = Vec::with_capacity(history.len() - start + 1);
    lines.push(cfg.history_header.clone());
    for msg in &history[start..] {
        let label = match msg.role {
            Role::User => &cfg.student_label,
            _ => &cfg.tutor_label,
        };
        lines.push(format!("{label}: {}", msg.content));
    }
    lines.join("\n")
}

/// One chunk returned by the retrieval layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: None,
            score: None,
        }
    }
}

/// Renders chunks as numbered sources separated by blank lines.
///
/// # Examples
///
/// ```
/// use tutor_core::RetrievalConfig;
/// use tutor_core::conversation::{RetrievedChunk, format_sources};
///
/// let chunks = [RetrievedChunk::new("יחס רפלקסיבי"), RetrievedChunk::new("יחס סימטרי")];
/// assert_eq!(
///     format_sources(&chunks, &RetrievalConfig::default()),
///     "מקור 1: יחס רפלקסיבי\n\nמקור 2: יחס סימטרי"
/// );
/// ```
pub fn format_sources(chunks: &[RetrievedChunk], cfg: &RetrievalConfig) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{} {}: {}", cfg.source_label, i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Display summary of a source that went into the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// 1-based position, matching the number in the rendered context.
    pub index: usize,
    pub source_id: Option<String>,
    pub score: Option<f64>,
    pub preview: String,
}

pub fn summarize_sources(chunks: &[RetrievedChunk], cfg: &RetrievalConfig) -> Vec<SourceSummary> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| SourceSummary {
            index: i + 1,
            source_id: chunk.source_id.clone(),
            score: chunk.score,
            preview: truncate_str(&chunk.text, cfg.preview_chars),
        })
        .collect()
}

/// Truncates a string to fit within `max_len` characters, appending `…` if needed.
///
/// Uses character boundaries instead of byte offsets so Hebrew text never
/// splits mid-character.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}\u{2026}")
    }
}
