//! Application state and command handlers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;
use tutor_core::{
    ConversationMessage, CoreError, Interaction, PreparedPrompt, RetrievedChunk, TutorConfig,
    TutorEngine,
};
use tutor_pm::{RenderedPrompt, VariantKey};

/// Flag values for the `render` command.
pub struct RenderArgs {
    pub subject: String,
    pub mode: String,
    pub course_name: Option<String>,
    pub syllabus_file: Option<PathBuf>,
    pub context_file: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
    pub query: String,
}

/// Result of preparing an interaction for output.
enum Outcome {
    Prompt(PreparedPrompt),
    /// Retrieval came back empty for a grounded mode; carries the reply.
    Fallback(String),
}

pub struct App {
    engine: TutorEngine,
}

impl App {
    /// Builds the engine from the project root and optional config file.
    pub fn new(project: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let project_root = match project {
            Some(root) => root,
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };

        let engine = match config {
            Some(path) => TutorEngine::with_config(project_root, TutorConfig::load(&path)?)?,
            None => TutorEngine::new(project_root)?,
        };
        Ok(Self { engine })
    }

    pub fn render(&self, args: RenderArgs, json: bool) -> Result<()> {
        let interaction = interaction_from_args(args)?;
        let outcome = self.prepare(&interaction)?;
        print_outcome(&outcome, json)
    }

    pub fn render_file(&self, path: &Path, json: bool) -> Result<()> {
        let interaction: Interaction = serde_json::from_str(&read(path)?)
            .with_context(|| format!("Invalid interaction JSON in {}", path.display()))?;
        let outcome = self.prepare(&interaction)?;
        print_outcome(&outcome, json)
    }

    fn prepare(&self, interaction: &Interaction) -> Result<Outcome> {
        match self.engine.prepare(interaction) {
            Ok(prepared) => Ok(Outcome::Prompt(prepared)),
            Err(CoreError::NoRelevantContent { reply }) => {
                warn!("No sources for a grounded mode, returning fallback reply");
                Ok(Outcome::Fallback(reply))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> Result<()> {
        println!(
            "{:<15} {:<12} {:<7} {:<9} {:<34} USER",
            "MODE", "SUBJECT", "COURSE", "SYLLABUS", "SYSTEM"
        );
        for key in VariantKey::all() {
            println!("{}", format_key_row(&key));
        }
        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        // The engine validated the catalog while loading.
        let pm = self.engine.prompt_manager();
        println!("Catalog OK: {} templates", pm.template_count());
        for name in pm.template_names() {
            println!("  {name}");
        }
        Ok(())
    }

    pub fn show(&self, name: &str) -> Result<()> {
        let Some(template) = self.engine.prompt_manager().get_template(name) else {
            bail!("Template not found: {name}");
        };
        println!("{}", template.content());
        Ok(())
    }
}

/// Builds an interaction from `render` flags. The context file becomes the
/// single retrieved source.
fn interaction_from_args(args: RenderArgs) -> Result<Interaction> {
    let history: Vec<ConversationMessage> = match &args.history_file {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("Invalid history JSON in {}", path.display()))?,
        None => Vec::new(),
    };

    let mut sources = Vec::new();
    if let Some(path) = &args.context_file {
        let text = read(path)?;
        if !text.trim().is_empty() {
            let mut chunk = RetrievedChunk::new(text.trim_end());
            chunk.source_id = Some(path.display().to_string());
            sources.push(chunk);
        }
    }

    let syllabus_content = match &args.syllabus_file {
        Some(path) => Some(read(path)?),
        None => None,
    };

    Ok(Interaction {
        subject: args.subject,
        mode: args.mode,
        course_name: args.course_name,
        syllabus_content,
        history,
        sources,
        query: args.query,
    })
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<()> {
    match outcome {
        Outcome::Prompt(prepared) if json => {
            println!("{}", serde_json::to_string_pretty(prepared)?);
        }
        Outcome::Prompt(prepared) => println!("{}", format_prompt_text(&prepared.prompt)),
        Outcome::Fallback(reply) => println!("{reply}"),
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Plain-text layout of a rendered prompt.
fn format_prompt_text(prompt: &RenderedPrompt) -> String {
    format!(
        "=== system ===\n{}\n\n=== user ===\n{}",
        prompt.system_text, prompt.user_text
    )
}

fn format_key_row(key: &VariantKey) -> String {
    format!(
        "{:<15} {:<12} {:<7} {:<9} {:<34} {}",
        key.mode.to_string(),
        key.subject.to_string(),
        yes_no(key.has_course_name),
        yes_no(key.has_syllabus),
        key.system_template(),
        key.user_template()
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
