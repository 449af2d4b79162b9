//! Markdown template documents.
//!
//! A document holds several named variants. Each `## <section>` heading
//! starts a variant; the variant text is the first fenced code block under
//! the heading, or the whole trimmed section text when there is no fence.
//! Anything before the first heading is commentary and is ignored.
//!
//! ````text
//! # Chat prompts
//!
//! ## mathematics/plain
//!
//! ```text
//! אתה עוזר הוראה ...
//! ```
//! ````

use crate::{PromptError, PromptTemplate};

const FENCE: &str = "```";

/// Parses a document into templates named `<doc_name>/<section>`.
///
/// Section names are trimmed and lowercased.
///
/// # Errors
///
/// Returns `PromptError::InvalidTemplate` for an empty heading, a duplicate
/// section, an unterminated fence, or a section with no text.
///
/// # Examples
///
/// ```
/// use tutor_pm::document::parse_document;
///
/// let doc = "# notes\n\n## System\n\n```text\nשלום {query}\n```\n";
/// let templates = parse_document("guided", doc).unwrap();
/// assert_eq!(templates.len(), 1);
/// assert_eq!(templates[0].name(), "guided/system");
/// assert_eq!(templates[0].content(), "שלום {query}");
/// ```
pub fn parse_document(doc_name: &str, content: &str) -> Result<Vec<PromptTemplate>, PromptError> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();
    let mut in_fence = false;

    for line in content.lines() {
        if !in_fence && let Some(heading) = line.strip_prefix("## ") {
            let name = heading.trim().to_lowercase();
            if name.is_empty() {
                return Err(PromptError::InvalidTemplate(format!(
                    "{doc_name}: empty section heading"
                )));
            }
            if sections.iter().any(|(existing, _)| *existing == name) {
                return Err(PromptError::InvalidTemplate(format!(
                    "{doc_name}: duplicate section '{name}'"
                )));
            }
            sections.push((name, Vec::new()));
            continue;
        }

        if in_fence {
            in_fence = line.trim() != FENCE;
        } else if line.trim_start().starts_with(FENCE) {
            in_fence = true;
        }
        if let Some((_, lines)) = sections.last_mut() {
            lines.push(line);
        }
    }

    sections
        .into_iter()
        .map(|(section, lines)| {
            let name = if doc_name.is_empty() {
                section
            } else {
                format!("{doc_name}/{section}")
            };
            let body = section_body(&name, &lines)?;
            if body.trim().is_empty() {
                return Err(PromptError::InvalidTemplate(format!(
                    "{name}: section has no text"
                )));
            }
            Ok(PromptTemplate::new(name, body))
        })
        .collect()
}

/// Extracts the first fenced block, or the trimmed text when unfenced.
fn section_body(name: &str, lines: &[&str]) -> Result<String, PromptError> {
    let Some(open) = lines
        .iter()
        .position(|l| l.trim_start().starts_with(FENCE))
    else {
        return Ok(lines.join("\n").trim().to_string());
    };

    let close = lines[open + 1..]
        .iter()
        .position(|l| l.trim() == FENCE)
        .ok_or_else(|| PromptError::InvalidTemplate(format!("{name}: unterminated code fence")))?;

    Ok(lines[open + 1..open + 1 + close].join("\n"))
}
