//! CLI argument parsing.
//!
//! Defines the command-line interface using clap. Supports five
//! subcommands: `render`, `render-file`, `list`, `check`, and `show`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{App, RenderArgs};

/// Render tutoring prompts from the built-in catalog and local overrides.
#[derive(Parser)]
#[command(name = "tutor-prompts")]
#[command(author, version, about = "Render tutoring prompts from the prompt catalog")]
pub struct Cli {
    /// Project root holding `.tutor/config.yml` (defaults to the current directory).
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Config file to use instead of `<project>/.tutor/config.yml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Render the system and user prompt for one interaction.
    Render {
        /// Subject area: mathematics, humanities or general.
        #[arg(long)]
        subject: String,

        /// Chat mode: guided_solving, rag_chat or free_chat.
        #[arg(long)]
        mode: String,

        /// Course name, if known.
        #[arg(long)]
        course_name: Option<String>,

        /// File with the course syllabus text.
        #[arg(long)]
        syllabus_file: Option<PathBuf>,

        /// File with the retrieved context text.
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// JSON file with prior messages (`[{"role": "user", "content": "..."}]`).
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// The student's message.
        #[arg(long)]
        query: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prepare a prompt from an interaction JSON file.
    RenderFile {
        /// Path to the interaction JSON.
        path: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every selection and the templates it resolves to.
    List,

    /// Load and validate the catalog, including overrides.
    Check,

    /// Print a template's raw text.
    Show {
        /// Template name (e.g., "chat/mathematics/course").
        name: String,
    },
}

impl Cli {
    /// Executes the parsed CLI command.
    pub fn run(self) -> Result<()> {
        let app = App::new(self.project, self.config)?;

        match self.command {
            Commands::Render {
                subject,
                mode,
                course_name,
                syllabus_file,
                context_file,
                history_file,
                query,
                json,
            } => app.render(
                RenderArgs {
                    subject,
                    mode,
                    course_name,
                    syllabus_file,
                    context_file,
                    history_file,
                    query,
                },
                json,
            ),
            Commands::RenderFile { path, json } => app.render_file(&path, json),
            Commands::List => app.list(),
            Commands::Check => app.check(),
            Commands::Show { name } => app.show(&name),
        }
    }
}
