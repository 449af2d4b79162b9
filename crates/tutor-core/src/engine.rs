//! Tutor engine: catalog loading and per-interaction prompt preparation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tutor_pm::{ChatMode, PromptManager, RenderRequest, RenderedPrompt, SubjectArea, VariantKey};

use crate::config::TutorConfig;
use crate::conversation::{
    ConversationMessage, RetrievedChunk, SourceSummary, format_conversation_context,
    format_sources, summarize_sources,
};
use crate::CoreError;

/// One student interaction as received from a chat-handling service.
///
/// Tags are kept as strings so that an unknown subject or mode is reported
/// as a configuration error by [`TutorEngine::prepare`] instead of failing
/// at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub subject: String,
    pub mode: String,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub syllabus_content: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
    #[serde(default)]
    pub sources: Vec<RetrievedChunk>,
    pub query: String,
}

/// The rendered prompt for an interaction, with what went into it.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPrompt {
    pub key: VariantKey,
    pub prompt: RenderedPrompt,
    pub sources: Vec<SourceSummary>,
}

/// The tutoring engine.
///
/// Owns the configuration and the prompt catalog. The catalog is built and
/// validated once in the constructor and only read afterwards, so one
/// engine can be shared across threads (e.g. behind an `Arc`).
pub struct TutorEngine {
    /// Root directory that relative config paths resolve against.
    project_root: PathBuf,

    /// Configuration loaded from `.tutor/config.yml`.
    config: TutorConfig,

    /// Prompt template manager loaded with built-in and custom templates.
    pm: PromptManager,
}

impl TutorEngine {
    /// Creates an engine for the given project root.
    ///
    /// Loads configuration from `.tutor/config.yml` (falling back to
    /// defaults if the file doesn't exist), then builds the catalog as in
    /// [`with_config`](Self::with_config).
    ///
    /// # Errors
    ///
    /// Returns `CoreError` if configuration parsing fails or the catalog
    /// cannot be built.
    pub fn new(project_root: PathBuf) -> Result<Self, CoreError> {
        let config = TutorConfig::load_from_project(&project_root)?;
        Self::with_config(project_root, config)
    }

    /// Creates an engine with an explicit configuration.
    ///
    /// Loads the built-in templates, applies every existing directory in
    /// `prompts.extra_dirs` on top of them, and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::PromptError` if an override directory is
    /// unreadable or malformed, or the final catalog is incomplete.
    pub fn with_config(project_root: PathBuf, config: TutorConfig) -> Result<Self, CoreError> {
        let mut pm = PromptManager::with_builtin_templates()?;
        info!(
            template_count = pm.template_count(),
            "Loaded built-in templates"
        );

        for extra_dir in &config.prompts.extra_dirs {
            let dir = project_root.join(extra_dir);
            if dir.exists() {
                let count = pm.load_from_dir(&dir)?;
                info!(dir = %dir.display(), count, "Loaded custom templates");
            } else {
                warn!(dir = %dir.display(), "Template directory not found, skipping");
            }
        }

        pm.validate_catalog()?;

        Ok(Self {
            project_root,
            config,
            pm,
        })
    }

    /// Returns a reference to the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Returns a reference to the prompt manager.
    pub fn prompt_manager(&self) -> &PromptManager {
        &self.pm
    }

    /// Renders an already-assembled request.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::PromptError` on a catalog or placeholder error.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedPrompt, CoreError> {
        Ok(self.pm.render_request(request)?)
    }

    /// Builds the prompt pair for one interaction.
    ///
    /// Parses the subject and mode tags, formats history and sources with
    /// the configured labels, and renders the selected templates. Nothing
    /// is returned unless both texts rendered completely.
    ///
    /// # Errors
    ///
    /// - `CoreError::PromptError` wrapping `ConfigurationError` for an
    ///   unknown subject or mode tag
    /// - `CoreError::InvalidInput` for a blank query
    /// - `CoreError::NoRelevantContent` when a grounded mode (guided solving
    ///   or RAG chat) has no sources and `retrieval.require_sources` is set
    pub fn prepare(&self, interaction: &Interaction) -> Result<PreparedPrompt, CoreError> {
        let subject: SubjectArea = interaction.subject.parse()?;
        let mode: ChatMode = interaction.mode.parse()?;

        if interaction.query.trim().is_empty() {
            return Err(CoreError::InvalidInput("query is required".to_string()));
        }

        let grounded = matches!(mode, ChatMode::GuidedSolving | ChatMode::RagChat);
        if grounded && interaction.sources.is_empty() && self.config.retrieval.require_sources {
            warn!(%mode, %subject, "No relevant content found for query");
            return Err(CoreError::NoRelevantContent {
                reply: self.config.retrieval.no_content_reply.clone(),
            });
        }

        let mut request = RenderRequest::new(subject, mode, interaction.query.as_str())
            .with_context(format_sources(&interaction.sources, &self.config.retrieval))
            .with_conversation_context(format_conversation_context(
                &interaction.history,
                &self.config.conversation,
            ));
        request.course_name = interaction.course_name.clone();
        request.syllabus_content = interaction.syllabus_content.clone();

        let key = request.variant_key();
        let prompt = self.pm.render_request(&request)?;
        debug!(
            %key,
            system_template = key.system_template(),
            user_template = key.user_template(),
            history = interaction.history.len(),
            sources = interaction.sources.len(),
            "Prepared prompt"
        );

        Ok(PreparedPrompt {
            key,
            prompt,
            sources: summarize_sources(&interaction.sources, &self.config.retrieval),
        })
    }
}

impl std::fmt::Debug for TutorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorEngine")
            .field("project_root", &self.project_root)
            .field("template_count", &self.pm.template_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tutor_pm::PromptError;

    use super::*;
    use crate::conversation::Role;

    fn engine() -> (tempfile::TempDir, TutorEngine) {
        let dir = tempfile::tempdir().unwrap();
        let engine = TutorEngine::new(dir.path().to_path_buf()).unwrap();
        (dir, engine)
    }

    fn interaction(subject: &str, mode: &str) -> Interaction {
        Interaction {
            subject: subject.to_string(),
            mode: mode.to_string(),
            course_name: None,
            syllabus_content: None,
            history: vec![
                ConversationMessage::new(Role::User, "היי"),
                ConversationMessage::new(Role::Assistant, "שלום, איך אוכל לעזור לך היום?"),
            ],
            sources: vec![RetrievedChunk::new(
                "יחס שקילות הוא יחס רפלקסיבי, סימטרי וטרנזיטיבי",
            )],
            query: "מה זה יחס שקילות?".to_string(),
        }
    }

    #[test]
    fn test_should_prepare_guided_prompt_with_history_and_sources() {
        let (_dir, engine) = engine();
        let prepared = engine.prepare(&interaction("מתמטי", "test_myself")).unwrap();

        assert_eq!(prepared.key.mode, ChatMode::GuidedSolving);
        assert_eq!(prepared.key.system_template(), "guided/system");
        let user = &prepared.prompt.user_text;
        assert!(user.contains("הקשר השיחה הקודמת:\nסטודנט: היי"));
        assert!(user.contains("מקור 1: יחס שקילות"));
        assert!(user.contains("מה זה יחס שקילות?"));
        assert_eq!(prepared.sources.len(), 1);
    }

    #[test]
    fn test_should_prepare_rag_prompt_with_course_name() {
        let (_dir, engine) = engine();
        let mut req = interaction("mathematics", "rag_chat");
        req.course_name = Some("Calculus I".to_string());

        let prepared = engine.prepare(&req).unwrap();
        assert_eq!(prepared.key.system_template(), "chat/mathematics/course");
        assert!(prepared.prompt.system_text.contains("Calculus I"));
        assert!(!prepared.prompt.system_text.contains("{course_name}"));
        assert!(prepared.prompt.user_text.contains("מקור 1:"));
    }

    #[test]
    fn test_should_allow_free_chat_without_sources() {
        let (_dir, engine) = engine();
        let mut req = interaction("general", "free_chat");
        req.sources.clear();
        req.history.clear();

        let prepared = engine.prepare(&req).unwrap();
        assert!(prepared.prompt.user_text.contains("זוהי תחילת השיחה."));
        assert!(prepared.sources.is_empty());
    }

    #[test]
    fn test_should_embed_free_chat_sources_in_user_text() {
        let (_dir, engine) = engine();
        let mut req = interaction("general", "free_chat");
        req.sources = vec![RetrievedChunk::new("משפט פיתגורס חל במשולש ישר זווית")];

        let prepared = engine.prepare(&req).unwrap();
        assert_eq!(prepared.sources.len(), 1);
        assert!(
            prepared
                .prompt
                .user_text
                .contains("מקור 1: משפט פיתגורס חל במשולש ישר זווית")
        );
    }

    #[test]
    fn test_should_refuse_grounded_mode_without_sources() {
        let (_dir, engine) = engine();
        let mut req = interaction("humanities", "rag_chat");
        req.sources.clear();

        match engine.prepare(&req).unwrap_err() {
            CoreError::NoRelevantContent { reply } => {
                assert_eq!(reply, "לא נמצא תוכן רלוונטי לשאלתך")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_should_render_empty_context_when_sources_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TutorConfig::default();
        config.retrieval.require_sources = false;
        let engine = TutorEngine::with_config(dir.path().to_path_buf(), config).unwrap();

        let mut req = interaction("general", "guided_solving");
        req.sources.clear();
        assert!(engine.prepare(&req).is_ok());
    }

    #[test]
    fn test_should_reject_unknown_subject() {
        let (_dir, engine) = engine();
        let err = engine.prepare(&interaction("chemistry", "rag_chat")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PromptError(PromptError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_should_reject_unknown_mode() {
        let (_dir, engine) = engine();
        let err = engine.prepare(&interaction("general", "quiz_mode")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PromptError(PromptError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_should_reject_blank_query() {
        let (_dir, engine) = engine();
        let mut req = interaction("general", "free_chat");
        req.query = "  ".to_string();
        assert!(matches!(
            engine.prepare(&req).unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_should_apply_template_overrides_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = dir.path().join(".tutor/prompts");
        fs::create_dir_all(&prompts).unwrap();
        fs::write(
            prompts.join("chat.md"),
            "## user/free\n```text\n{conversation_context}\n---\n{query}\n```\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".tutor/config.yml"),
            "prompts:\n  extra_dirs: [\".tutor/prompts\", \"missing-dir\"]\n",
        )
        .unwrap();

        let engine = TutorEngine::new(dir.path().to_path_buf()).unwrap();
        let mut req = interaction("general", "free_chat");
        req.history.clear();
        let prepared = engine.prepare(&req).unwrap();
        assert_eq!(
            prepared.prompt.user_text,
            "זוהי תחילת השיחה.\n---\nמה זה יחס שקילות?"
        );
    }

    #[test]
    fn test_should_fail_startup_on_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = dir.path().join("prompts");
        fs::create_dir_all(&prompts).unwrap();
        fs::write(prompts.join("guided.md"), "## user\n{student_name} {query}\n").unwrap();

        let mut config = TutorConfig::default();
        config.prompts.extra_dirs = vec!["prompts".to_string()];
        let err = TutorEngine::with_config(dir.path().to_path_buf(), config).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PromptError(PromptError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_should_deserialize_interaction_from_json() {
        let json = r#"{
            "subject": "הומני",
            "mode": "rag-chat",
            "course_name": "היסטוריה של אירופה",
            "history": [{"role": "user", "content": "היי"}],
            "sources": [{"text": "הרנסאנס החל באיטליה", "source_id": "7", "score": 1.5}],
            "query": "היכן החל הרנסאנס?"
        }"#;
        let parsed: Interaction = serde_json::from_str(json).unwrap();
        let (_dir, engine) = engine();
        let prepared = engine.prepare(&parsed).unwrap();
        assert_eq!(prepared.key.system_template(), "chat/humanities/course");
        assert_eq!(prepared.sources[0].source_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_should_share_engine_across_threads() {
        let (_dir, engine) = engine();
        let engine = Arc::new(engine);
        let req = interaction("general", "rag_chat");
        let expected = engine.prepare(&req).unwrap().prompt;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let req = req.clone();
                std::thread::spawn(move || engine.prepare(&req).unwrap().prompt)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
