//! Prompt manager implementation.
//!
//! Holds the template table. Templates come from the built-in documents,
//! from override directories, or from manual registration, and are read
//! without locking once the manager is built.

use std::collections::HashMap;
use std::path::Path;

use crate::builtin::builtin_templates;
use crate::loader::load_templates_from_dir;
use crate::selection::catalog_template_names;
use crate::{
    Placeholder, PromptError, PromptTemplate, PromptValues, RenderRequest, RenderedPrompt,
    VariantKey,
};

/// Manages prompt templates and renders selected variants.
///
/// Templates can be added individually via [`add_template`](Self::add_template)
/// or loaded in bulk from a directory via [`load_from_dir`](Self::load_from_dir).
/// Call [`validate_catalog`](Self::validate_catalog) after loading overrides
/// to catch a broken catalog at startup.
#[derive(Clone)]
pub struct PromptManager {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptManager {
    /// Creates a new empty prompt manager with no templates loaded.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Creates a manager pre-loaded with the built-in template documents.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::InvalidTemplate` if a built-in document is
    /// malformed.
    pub fn with_builtin_templates() -> Result<Self, PromptError> {
        let mut pm = Self::new();
        for template in builtin_templates()? {
            pm.add_template(template);
        }
        Ok(pm)
    }

    /// Registers a single template, replacing any template with the same name.
    pub fn add_template(&mut self, template: PromptTemplate) {
        self.templates.insert(template.name().to_string(), template);
    }

    /// Loads all `.md` template documents from a directory recursively.
    ///
    /// Existing templates with the same name are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::IoError` if the directory cannot be read, or
    /// `PromptError::InvalidTemplate` if a document is malformed.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<usize, PromptError> {
        let templates = load_templates_from_dir(dir)?;
        let count = templates.len();
        for template in templates {
            self.add_template(template);
        }
        Ok(count)
    }

    /// Checks that every template the selection can return exists and
    /// references only known placeholders.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::ConfigurationError` listing missing templates,
    /// or `PromptError::InvalidTemplate` for an unknown placeholder.
    pub fn validate_catalog(&self) -> Result<(), PromptError> {
        let names = catalog_template_names();

        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.templates.contains_key(*n))
            .collect();
        if !missing.is_empty() {
            return Err(PromptError::ConfigurationError(format!(
                "catalog is missing templates: {}",
                missing.join(", ")
            )));
        }

        for name in names {
            let Some(template) = self.templates.get(name) else {
                continue;
            };
            if let Some(unknown) = template
                .placeholders()
                .into_iter()
                .find(|p| !Placeholder::is_known(p))
            {
                return Err(PromptError::InvalidTemplate(format!(
                    "{name}: unknown placeholder {{{unknown}}}"
                )));
            }
        }
        Ok(())
    }

    /// Renders a named template with the given values.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::TemplateNotFound` if no template with the given
    /// name exists, or `PromptError::MissingPlaceholderError` if a value is
    /// absent.
    pub fn render(&self, name: &str, values: &PromptValues) -> Result<String, PromptError> {
        self.templates
            .get(name)
            .ok_or_else(|| PromptError::TemplateNotFound(name.to_string()))?
            .render(values)
    }

    /// Renders the system and user templates selected by `key`.
    ///
    /// Both texts are rendered before either is returned, so a failure
    /// yields no output at all.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::ConfigurationError` if the catalog lacks a
    /// selected template, or `PromptError::MissingPlaceholderError` if
    /// `values` lacks a referenced placeholder.
    pub fn render_variant(
        &self,
        key: VariantKey,
        values: &PromptValues,
    ) -> Result<RenderedPrompt, PromptError> {
        let system_text = self.render_selected(key, key.system_template(), values)?;
        let user_text = self.render_selected(key, key.user_template(), values)?;
        Ok(RenderedPrompt {
            system_text,
            user_text,
        })
    }

    /// Selects and renders the prompt pair for one interaction.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutor_pm::{ChatMode, PromptManager, RenderRequest, SubjectArea};
    ///
    /// let pm = PromptManager::with_builtin_templates().unwrap();
    /// let req = RenderRequest::new(SubjectArea::Mathematics, ChatMode::RagChat, "מה זה נגזרת?")
    ///     .with_course_name("Calculus I")
    ///     .with_context("מקור 1: נגזרת היא קצב שינוי רגעי.");
    ///
    /// let prompt = pm.render_request(&req).unwrap();
    /// assert!(prompt.system_text.contains("Calculus I"));
    /// assert!(!prompt.system_text.contains("{course_name}"));
    /// assert!(prompt.user_text.contains("מה זה נגזרת?"));
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`render_variant`](Self::render_variant).
    pub fn render_request(&self, request: &RenderRequest) -> Result<RenderedPrompt, PromptError> {
        self.render_variant(request.variant_key(), &request.values())
    }

    fn render_selected(
        &self,
        key: VariantKey,
        name: &str,
        values: &PromptValues,
    ) -> Result<String, PromptError> {
        let template = self.templates.get(name).ok_or_else(|| {
            PromptError::ConfigurationError(format!("no template '{name}' for selection {key}"))
        })?;
        template.render(values)
    }

    /// Returns a reference to the template with the given name, if it exists.
    pub fn get_template(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    /// Number of registered templates.
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PromptManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptManager")
            .field("template_count", &self.templates.len())
            .field("template_names", &self.template_names())
            .finish()
    }
}
