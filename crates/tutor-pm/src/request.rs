//! Render request and rendered output types.

use serde::{Deserialize, Serialize};

use crate::{ChatMode, Placeholder, PromptValues, SubjectArea, VariantKey};

/// Runtime inputs for one student interaction.
///
/// # Examples
///
/// ```
/// use tutor_pm::{ChatMode, RenderRequest, SubjectArea};
///
/// let req = RenderRequest::new(SubjectArea::Mathematics, ChatMode::RagChat, "מה זה נגזרת?")
///     .with_course_name("Calculus I");
/// let key = req.variant_key();
/// assert!(key.has_course_name);
/// assert!(!key.has_syllabus);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub subject: SubjectArea,
    pub mode: ChatMode,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub syllabus_content: Option<String>,
    /// Retrieved reference text.
    #[serde(default)]
    pub context: String,
    /// Formatted conversation history.
    #[serde(default)]
    pub conversation_context: String,
    pub query: String,
}

impl RenderRequest {
    pub fn new(subject: SubjectArea, mode: ChatMode, query: impl Into<String>) -> Self {
        Self {
            subject,
            mode,
            course_name: None,
            syllabus_content: None,
            context: String::new(),
            conversation_context: String::new(),
            query: query.into(),
        }
    }

    pub fn with_course_name(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = Some(course_name.into());
        self
    }

    pub fn with_syllabus(mut self, syllabus_content: impl Into<String>) -> Self {
        self.syllabus_content = Some(syllabus_content.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_conversation_context(mut self, conversation_context: impl Into<String>) -> Self {
        self.conversation_context = conversation_context.into();
        self
    }

    /// Selection key. A blank course name or syllabus counts as absent.
    pub fn variant_key(&self) -> VariantKey {
        VariantKey::new(
            self.subject,
            present(&self.course_name).is_some(),
            present(&self.syllabus_content).is_some(),
            self.mode,
        )
    }

    /// Placeholder values. Optional fields are only included when present.
    pub fn values(&self) -> PromptValues {
        let mut values = PromptValues::new()
            .with(Placeholder::Context, self.context.as_str())
            .with(Placeholder::ConversationContext, self.conversation_context.as_str())
            .with(Placeholder::Query, self.query.as_str());
        if let Some(name) = present(&self.course_name) {
            values.insert(Placeholder::CourseName, name);
        }
        if let Some(syllabus) = present(&self.syllabus_content) {
            values.insert(Placeholder::SyllabusContent, syllabus);
        }
        values
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// A system/user message pair ready for a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    pub system_text: String,
    pub user_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_treat_blank_optionals_as_absent() {
        let req = RenderRequest::new(SubjectArea::General, ChatMode::FreeChat, "q")
            .with_course_name("   ")
            .with_syllabus("");
        let key = req.variant_key();
        assert!(!key.has_course_name);
        assert!(!key.has_syllabus);

        let values = req.values();
        assert!(!values.contains("course_name"));
        assert!(!values.contains("syllabus_content"));
    }

    #[test]
    fn test_should_always_include_turn_values() {
        let values = RenderRequest::new(SubjectArea::General, ChatMode::RagChat, "").values();
        assert_eq!(values.get("query"), Some(""));
        assert_eq!(values.get("context"), Some(""));
        assert_eq!(values.get("conversation_context"), Some(""));
    }

    #[test]
    fn test_should_deserialize_request_from_json() {
        let json = r#"{
            "subject": "מתמטי",
            "mode": "guided-solving",
            "course_name": "בדידה",
            "query": "מה זה יחס שקילות?"
        }"#;
        let req: RenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subject, SubjectArea::Mathematics);
        assert_eq!(req.mode, ChatMode::GuidedSolving);
        assert_eq!(req.course_name.as_deref(), Some("בדידה"));
        assert!(req.context.is_empty());
    }
}
