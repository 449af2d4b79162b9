//! Template loader for Markdown template documents.
//!
//! Recursively walks a directory, parsing every `.md` file as a template
//! document. Document names come from relative paths (e.g., `chat` from
//! `chat.md`, `course/chat` from `course/chat.md`), and each `##` section
//! in the document becomes one template under that name.

use std::path::Path;

use crate::document::parse_document;
use crate::{PromptError, PromptTemplate};

/// Recursively loads all `.md` template documents from the given directory.
///
/// # Examples
///
/// Given a directory structure:
/// ```text
/// prompts/
/// ├── chat.md          (sections: mathematics/plain, user/rag)
/// └── course/
///     └── guided.md    (sections: system)
/// ```
///
/// This produces templates named `chat/mathematics/plain`, `chat/user/rag`
/// and `course/guided/system`.
///
/// # Errors
///
/// Returns `PromptError::IoError` if the directory cannot be read or a file
/// cannot be opened, and `PromptError::InvalidTemplate` if a document is
/// malformed. The error message names the offending file.
pub fn load_templates_from_dir(dir: &Path) -> Result<Vec<PromptTemplate>, PromptError> {
    let mut templates = Vec::new();
    load_templates_recursive(dir, dir, &mut templates)?;
    Ok(templates)
}

/// Recursively walks directory entries, collecting templates from `.md` files.
fn load_templates_recursive(
    base: &Path,
    current: &Path,
    templates: &mut Vec<PromptTemplate>,
) -> Result<(), PromptError> {
    let mut entries = std::fs::read_dir(current)?.collect::<Result<Vec<_>, _>>()?;
    // Stable order so later files deterministically win on name clashes.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(base, &path, templates)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            let relative = path
                .strip_prefix(base)
                .map_err(|e| PromptError::IoError(std::io::Error::other(e)))?;

            let doc_name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");

            let content = std::fs::read_to_string(&path)?;
            let parsed = parse_document(&doc_name, &content).map_err(|e| match e {
                PromptError::InvalidTemplate(msg) => {
                    PromptError::InvalidTemplate(format!("{} ({msg})", path.display()))
                }
                other => other,
            })?;
            templates.extend(parsed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_should_load_templates_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("chat.md"),
            "## mathematics/plain\n```\nmath {query}\n```\n## user/rag\n```\n{context}\n```\n",
        )
        .unwrap();

        let templates = load_templates_from_dir(dir.path()).unwrap();
        assert_eq!(templates.len(), 2);

        let names: Vec<&str> = templates.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"chat/mathematics/plain"));
        assert!(names.contains(&"chat/user/rag"));
    }

    #[test]
    fn test_should_ignore_non_md_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "## system\ntext").unwrap();
        fs::write(dir.path().join("guided.md"), "## system\nhello").unwrap();

        let templates = load_templates_from_dir(dir.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name(), "guided/system");
    }

    #[test]
    fn test_should_return_empty_for_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let templates = load_templates_from_dir(dir.path()).unwrap();
        assert!(templates.is_empty());
    }

    #[test]
    fn test_should_handle_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.md"), "## system\nDeep template").unwrap();

        let templates = load_templates_from_dir(dir.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name(), "a/b/deep/system");
    }

    #[test]
    fn test_should_name_file_in_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.md"), "## system\n```\nopen").unwrap();

        let err = load_templates_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("broken.md"), "got: {err}");
    }

    #[test]
    fn test_should_fail_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_templates_from_dir(&missing),
            Err(PromptError::IoError(_))
        ));
    }
}
