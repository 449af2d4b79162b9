//! Prompt template data structure.
//!
//! Contains `PromptTemplate`, a named template whose raw text is parsed once
//! into literal and `{placeholder}` segments, plus the `PromptValues` map
//! used to fill it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::PromptError;

/// Matches `{{`, `}}` and `{identifier}`, in that order of preference.
#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern must compile")
});

/// The placeholder names the built-in catalog understands.
///
/// # Examples
///
/// ```
/// use tutor_pm::Placeholder;
///
/// assert_eq!(Placeholder::CourseName.as_str(), "course_name");
/// assert!(Placeholder::is_known("conversation_context"));
/// assert!(!Placeholder::is_known("student_name"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    CourseName,
    SyllabusContent,
    Context,
    Query,
    ConversationContext,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Self::CourseName,
        Self::SyllabusContent,
        Self::Context,
        Self::Query,
        Self::ConversationContext,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CourseName => "course_name",
            Self::SyllabusContent => "syllabus_content",
            Self::Context => "context",
            Self::Query => "query",
            Self::ConversationContext => "conversation_context",
        }
    }

    /// Returns `true` if `name` is one of the known placeholder names.
    pub fn is_known(name: &str) -> bool {
        Self::ALL.iter().any(|p| p.as_str() == name)
    }

    /// The `{name}` token as it appears in template text.
    pub fn token(self) -> String {
        format!("{{{}}}", self.as_str())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Placeholder> for String {
    fn from(p: Placeholder) -> Self {
        p.as_str().to_string()
    }
}

/// Runtime values keyed by placeholder name.
///
/// An empty string is a valid value and renders as nothing; only an absent
/// key is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptValues {
    values: BTreeMap<String, String>,
}

impl PromptValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces the value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A named prompt template.
///
/// Template names use `/`-separated paths (e.g., `"chat/mathematics/course"`)
/// that mirror the document and section the template came from.
///
/// # Examples
///
/// ```
/// use tutor_pm::{PromptTemplate, PromptValues};
///
/// let tmpl = PromptTemplate::new("greeting", "שלום, {query}! {{literal}}");
/// assert_eq!(tmpl.name(), "greeting");
/// assert_eq!(tmpl.placeholders(), vec!["query"]);
///
/// let out = tmpl.render(&PromptValues::new().with("query", "עולם")).unwrap();
/// assert_eq!(out, "שלום, עולם! {literal}");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PromptTemplate {
    name: String,
    content: String,
    #[serde(skip)]
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Creates a template and parses its placeholders.
    ///
    /// `{{` and `}}` stand for literal braces. Brace text that is not an
    /// identifier (e.g. `{a + b}`) is kept as literal text.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let segments = parse_segments(&content);
        Self {
            name: name.into(),
            content,
            segments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw template text, before substitution.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    /// Returns `true` if the template references `name`.
    pub fn references(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(n) if n == name))
    }

    /// Substitutes every placeholder with its value.
    ///
    /// Values are inserted verbatim and never rescanned, so a value
    /// containing `{query}` stays as written.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::MissingPlaceholderError` naming the first
    /// placeholder with no value. Nothing is rendered in that case.
    pub fn render(&self, values: &PromptValues) -> Result<String, PromptError> {
        if let Some(missing) = self.placeholders().into_iter().find(|n| !values.contains(n)) {
            return Err(PromptError::MissingPlaceholderError {
                template: self.name.clone(),
                placeholder: missing.to_string(),
            });
        }

        let mut out = String::with_capacity(self.content.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(values.get(name).unwrap_or_default()),
            }
        }
        Ok(out)
    }
}

fn parse_segments(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        literal.push_str(&content[last..whole.start()]);
        last = whole.end();

        match caps.get(1) {
            Some(name) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.as_str().to_string()));
            }
            // `{{` or `}}`: keep one brace
            None => literal.push_str(&whole.as_str()[..1]),
        }
    }

    literal.push_str(&content[last..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_substitute_placeholders() {
        let tmpl = PromptTemplate::new("t", "קורס: {course_name}\nשאלה: {query}");
        let values = PromptValues::new()
            .with(Placeholder::CourseName, "חדו\"א 1")
            .with(Placeholder::Query, "מה זה גבול?");
        assert_eq!(
            tmpl.render(&values).unwrap(),
            "קורס: חדו\"א 1\nשאלה: מה זה גבול?"
        );
    }

    #[test]
    fn test_should_fail_on_missing_placeholder() {
        let tmpl = PromptTemplate::new("chat/x", "{course_name} / {syllabus_content}");
        let values = PromptValues::new().with("course_name", "Calculus I");

        let err = tmpl.render(&values).unwrap_err();
        match err {
            PromptError::MissingPlaceholderError {
                template,
                placeholder,
            } => {
                assert_eq!(template, "chat/x");
                assert_eq!(placeholder, "syllabus_content");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_should_render_empty_value_as_nothing() {
        let tmpl = PromptTemplate::new("t", "[{context}]");
        let out = tmpl.render(&PromptValues::new().with("context", "")).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_should_not_rescan_substituted_values() {
        let tmpl = PromptTemplate::new("t", "{query} / {context}");
        let values = PromptValues::new()
            .with("query", "{context}")
            .with("context", "ctx");
        assert_eq!(tmpl.render(&values).unwrap(), "{context} / ctx");
    }

    #[test]
    fn test_should_unescape_doubled_braces() {
        let tmpl = PromptTemplate::new("t", "{{course_name}} {{{query}}}");
        assert_eq!(tmpl.placeholders(), vec!["query"]);
        let out = tmpl.render(&PromptValues::new().with("query", "q")).unwrap();
        assert_eq!(out, "{course_name} {q}");
    }

    #[test]
    fn test_should_keep_non_identifier_braces_literal() {
        let tmpl = PromptTemplate::new("t", "set {1, 2} and {a + b} and {");
        assert!(tmpl.placeholders().is_empty());
        assert_eq!(
            tmpl.render(&PromptValues::new()).unwrap(),
            "set {1, 2} and {a + b} and {"
        );
    }

    #[test]
    fn test_should_list_placeholders_once_in_order() {
        let tmpl = PromptTemplate::new("t", "{query} {context} {query}");
        assert_eq!(tmpl.placeholders(), vec!["query", "context"]);
        assert!(tmpl.references("context"));
        assert!(!tmpl.references("course_name"));
    }

    #[test]
    fn test_should_render_identically_twice() {
        let tmpl = PromptTemplate::new("t", "שלום {query}");
        let values = PromptValues::new().with("query", "עולם");
        assert_eq!(tmpl.render(&values).unwrap(), tmpl.render(&values).unwrap());
    }
}
