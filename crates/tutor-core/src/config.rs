//! Configuration types for the tutoring service.
//!
//! Defines `TutorConfig` which is loaded from `.tutor/config.yml` under the
//! project root. Every section has defaults, so a partial file (or no file
//! at all) is valid. All fields use snake_case to match YAML conventions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CoreError;

/// Config file location relative to the project root.
pub const CONFIG_RELATIVE_PATH: &str = ".tutor/config.yml";

/// Top-level configuration loaded from `.tutor/config.yml`.
///
/// # Examples
///
/// ```
/// use tutor_core::TutorConfig;
///
/// let config = TutorConfig::default();
/// assert_eq!(config.version, 1);
/// assert_eq!(config.conversation.history_window, 5);
///
/// let yaml = "conversation:\n  history_window: 3\n";
/// let loaded: TutorConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(loaded.conversation.history_window, 3);
/// assert!(loaded.retrieval.require_sources);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Configuration schema version.
    pub version: u32,

    /// Prompt template configuration.
    pub prompts: PromptsConfig,

    /// Conversation history formatting.
    pub conversation: ConversationConfig,

    /// Retrieved-source formatting and grounding policy.
    pub retrieval: RetrievalConfig,
}

/// Configuration for prompt template directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Additional directories to load template documents from, relative to
    /// the project root. Templates in these directories override built-in
    /// templates with the same name.
    pub extra_dirs: Vec<String>,
}

/// How conversation history is rendered into `{conversation_context}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Number of most recent messages included.
    pub history_window: usize,

    /// Label for messages from the student.
    pub student_label: String,

    /// Label for every other message.
    pub tutor_label: String,

    /// Line placed above the rendered history.
    pub history_header: String,

    /// Text used when there is no history yet.
    pub empty_history: String,
}

/// How retrieved chunks are rendered into `{context}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Prefix for each numbered source (`"<label> 1: ..."`).
    pub source_label: String,

    /// Maximum characters in a source preview.
    pub preview_chars: usize,

    /// Refuse to build a prompt for grounded modes when no sources were
    /// retrieved.
    pub require_sources: bool,

    /// Reply shown to the student when `require_sources` rejects a request.
    pub no_content_reply: String,
}

impl TutorConfig {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConfigError` naming the path if the file cannot be
    /// read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!("Cannot read config file at {}: {e}", path.display()))
        })?;
        serde_yaml::from_str::<TutorConfig>(&content).map_err(|e| {
            CoreError::ConfigError(format!(
                "Invalid YAML in config file at {}: {e}",
                path.display()
            ))
        })
    }

    /// Loads `<project_root>/.tutor/config.yml`, or defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) when the file exists.
    pub fn load_from_project(project_root: &Path) -> Result<Self, CoreError> {
        let config_path = project_root.join(CONFIG_RELATIVE_PATH);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            info!("No {CONFIG_RELATIVE_PATH} found, using default configuration");
            Ok(Self::default())
        }
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            prompts: PromptsConfig::default(),
            conversation: ConversationConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: 5,
            student_label: "סטודנט".to_string(),
            tutor_label: "מורה".to_string(),
            history_header: "הקשר השיחה הקודמת:".to_string(),
            empty_history: "זוהי תחילת השיחה.".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            source_label: "מקור".to_string(),
            preview_chars: 150,
            require_sources: true,
            no_content_reply: "לא נמצא תוכן רלוונטי לשאלתך".to_string(),
        }
    }
}
