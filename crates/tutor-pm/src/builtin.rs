//! Built-in prompt templates embedded at compile time.
//!
//! All template documents under `crates/tutor-pm/templates/` are compiled
//! into the binary via [`include_str!`], so the catalog is always available
//! regardless of the runtime filesystem layout.
//!
//! When adding or removing a template document, update [`BUILTIN_DOCUMENTS`].

use crate::document::parse_document;
use crate::{PromptError, PromptTemplate};

/// The total number of built-in prompt templates across all documents.
///
/// Update this constant when adding or removing sections.
pub const BUILTIN_TEMPLATE_COUNT: usize = 16;

/// `(document name, document text)` pairs.
pub const BUILTIN_DOCUMENTS: &[(&str, &str)] = &[
    ("chat", include_str!("../templates/chat.md")),
    ("guided", include_str!("../templates/guided.md")),
];

/// Returns all built-in prompt templates, parsed from the embedded documents.
///
/// # Errors
///
/// Returns `PromptError::InvalidTemplate` if an embedded document is
/// malformed. The test suite guarantees this does not happen for the
/// shipped documents.
///
/// # Examples
///
/// ```
/// use tutor_pm::builtin::builtin_templates;
///
/// let templates = builtin_templates().unwrap();
/// assert_eq!(templates.len(), 16);
/// assert!(templates.iter().any(|t| t.name() == "guided/system"));
/// ```
pub fn builtin_templates() -> Result<Vec<PromptTemplate>, PromptError> {
    let mut templates = Vec::with_capacity(BUILTIN_TEMPLATE_COUNT);
    for (doc_name, content) in BUILTIN_DOCUMENTS {
        templates.extend(parse_document(doc_name, content)?);
    }
    Ok(templates)
}
