//! Tutor Prompt Manager
//!
//! The prompt catalog for the tutoring assistant. Template variants live in
//! Markdown documents (one `##` section per variant) embedded at compile
//! time, with optional override directories loaded at startup. A
//! [`VariantKey`] (subject area, course-name presence, syllabus presence,
//! chat mode) selects one system template and one user-turn template, and
//! `{placeholder}` tokens are replaced with runtime values.
//!
//! # Usage
//!
//! ```
//! use tutor_pm::{ChatMode, PromptManager, RenderRequest, SubjectArea};
//!
//! let pm = PromptManager::with_builtin_templates().unwrap();
//! pm.validate_catalog().unwrap();
//!
//! let request = RenderRequest::new(SubjectArea::Humanities, ChatMode::FreeChat, "מהו רנסאנס?")
//!     .with_conversation_context("זוהי תחילת השיחה.");
//! let prompt = pm.render_request(&request).unwrap();
//! assert!(prompt.user_text.contains("מהו רנסאנס?"));
//! ```

pub mod builtin;
pub mod document;
mod error;
pub mod loader;
mod manager;
mod request;
pub mod selection;
mod template;

pub use error::PromptError;
pub use manager::PromptManager;
pub use request::{RenderRequest, RenderedPrompt};
pub use selection::{ChatMode, SubjectArea, VariantKey};
pub use template::{Placeholder, PromptTemplate, PromptValues};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_manager_render() {
        let mut pm = PromptManager::new();
        pm.add_template(PromptTemplate::new("greeting", "שלום, {query}!"));

        let result = pm
            .render("greeting", &PromptValues::new().with("query", "עולם"))
            .unwrap();
        assert_eq!(result, "שלום, עולם!");
    }

    #[test]
    fn test_should_load_all_builtin_templates_via_with_builtin_templates() {
        let pm = PromptManager::with_builtin_templates().unwrap();
        assert_eq!(pm.template_count(), builtin::BUILTIN_TEMPLATE_COUNT);

        assert!(pm.get_template("guided/system").is_some());
        assert!(pm.get_template("chat/mathematics/course_syllabus").is_some());
        assert!(pm.get_template("chat/user/free").is_some());
    }

    #[test]
    fn test_should_fail_on_unknown_subject_tag() {
        let err = "chemistry".parse::<SubjectArea>().unwrap_err();
        assert!(matches!(err, PromptError::ConfigurationError(_)));
    }
}
