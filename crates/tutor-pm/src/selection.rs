//! Variant selection.
//!
//! A [`VariantKey`] (subject area, course-name presence, syllabus presence,
//! chat mode) resolves to exactly one system template and one user template
//! through exhaustive `match`es, so adding a subject or mode without a
//! template is a compile error rather than a runtime miss.

use std::fmt;
use std::str::FromStr;

use crate::PromptError;

/// System template for guided problem solving, shared by every subject.
pub const GUIDED_SYSTEM: &str = "guided/system";
/// User-turn wrapper for guided problem solving.
pub const GUIDED_USER: &str = "guided/user";
/// User-turn wrapper for retrieval-grounded chat.
pub const CHAT_USER_RAG: &str = "chat/user/rag";
/// User-turn wrapper for free chat.
pub const CHAT_USER_FREE: &str = "chat/user/free";

/// Academic domain that decides the response-style rules.
///
/// Parses case-insensitively from English names and the Hebrew subject-type
/// tags callers send.
///
/// # Examples
///
/// ```
/// use tutor_pm::SubjectArea;
///
/// assert_eq!("Mathematics".parse::<SubjectArea>().unwrap(), SubjectArea::Mathematics);
/// assert_eq!("הומני".parse::<SubjectArea>().unwrap(), SubjectArea::Humanities);
/// assert!("chemistry".parse::<SubjectArea>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectArea {
    Mathematics,
    Humanities,
    General,
}

impl SubjectArea {
    pub const ALL: [SubjectArea; 3] = [Self::Mathematics, Self::Humanities, Self::General];
}

impl fmt::Display for SubjectArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mathematics => write!(f, "mathematics"),
            Self::Humanities => write!(f, "humanities"),
            Self::General => write!(f, "general"),
        }
    }
}

impl FromStr for SubjectArea {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mathematics" | "math" | "מתמטי" => Ok(Self::Mathematics),
            "humanities" | "הומני" => Ok(Self::Humanities),
            "general" | "כללי" => Ok(Self::General),
            other => Err(PromptError::ConfigurationError(format!(
                "unknown subject area: {other}"
            ))),
        }
    }
}

impl serde::Serialize for SubjectArea {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for SubjectArea {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<SubjectArea>().map_err(serde::de::Error::custom)
    }
}

/// Conversation mode, selecting the template family.
///
/// # Examples
///
/// ```
/// use tutor_pm::ChatMode;
///
/// assert_eq!("rag-chat".parse::<ChatMode>().unwrap(), ChatMode::RagChat);
/// assert_eq!("test_myself".parse::<ChatMode>().unwrap(), ChatMode::GuidedSolving);
/// assert_eq!(ChatMode::FreeChat.to_string(), "free_chat");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatMode {
    /// Socratic tutoring that leads the student to the answer.
    GuidedSolving,
    /// Answers grounded in retrieved course material.
    RagChat,
    /// Open tutoring conversation.
    FreeChat,
}

impl ChatMode {
    pub const ALL: [ChatMode; 3] = [Self::GuidedSolving, Self::RagChat, Self::FreeChat];
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuidedSolving => write!(f, "guided_solving"),
            Self::RagChat => write!(f, "rag_chat"),
            Self::FreeChat => write!(f, "free_chat"),
        }
    }
}

impl FromStr for ChatMode {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "guided_solving" | "test_myself" => Ok(Self::GuidedSolving),
            "rag_chat" => Ok(Self::RagChat),
            "free_chat" => Ok(Self::FreeChat),
            other => Err(PromptError::ConfigurationError(format!(
                "unknown chat mode: {other}"
            ))),
        }
    }
}

impl serde::Serialize for ChatMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ChatMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<ChatMode>().map_err(serde::de::Error::custom)
    }
}

/// The selection tuple that picks one template pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct VariantKey {
    pub subject: SubjectArea,
    pub has_course_name: bool,
    pub has_syllabus: bool,
    pub mode: ChatMode,
}

impl VariantKey {
    pub fn new(subject: SubjectArea, has_course_name: bool, has_syllabus: bool, mode: ChatMode) -> Self {
        Self {
            subject,
            has_course_name,
            has_syllabus,
            mode,
        }
    }

    /// Every valid key: 3 subjects × 2 × 2 × 3 modes.
    pub fn all() -> Vec<VariantKey> {
        let mut keys = Vec::with_capacity(36);
        for mode in ChatMode::ALL {
            for subject in SubjectArea::ALL {
                for has_course_name in [false, true] {
                    for has_syllabus in [false, true] {
                        keys.push(Self::new(subject, has_course_name, has_syllabus, mode));
                    }
                }
            }
        }
        keys
    }

    /// Name of the system template for this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutor_pm::{ChatMode, SubjectArea, VariantKey};
    ///
    /// let key = VariantKey::new(SubjectArea::Mathematics, true, false, ChatMode::RagChat);
    /// assert_eq!(key.system_template(), "chat/mathematics/course");
    ///
    /// let guided = VariantKey::new(SubjectArea::Humanities, true, true, ChatMode::GuidedSolving);
    /// assert_eq!(guided.system_template(), "guided/system");
    /// ```
    pub fn system_template(&self) -> &'static str {
        use SubjectArea::*;

        match self.mode {
            ChatMode::GuidedSolving => GUIDED_SYSTEM,
            ChatMode::RagChat | ChatMode::FreeChat => {
                match (self.subject, self.has_course_name, self.has_syllabus) {
                    (Mathematics, false, false) => "chat/mathematics/plain",
                    (Mathematics, true, false) => "chat/mathematics/course",
                    (Mathematics, false, true) => "chat/mathematics/syllabus",
                    (Mathematics, true, true) => "chat/mathematics/course_syllabus",
                    (Humanities, false, false) => "chat/humanities/plain",
                    (Humanities, true, false) => "chat/humanities/course",
                    (Humanities, false, true) => "chat/humanities/syllabus",
                    (Humanities, true, true) => "chat/humanities/course_syllabus",
                    (General, false, false) => "chat/general/plain",
                    (General, true, false) => "chat/general/course",
                    (General, false, true) => "chat/general/syllabus",
                    (General, true, true) => "chat/general/course_syllabus",
                }
            }
        }
    }

    /// Name of the user-turn template for this key's mode.
    pub fn user_template(&self) -> &'static str {
        match self.mode {
            ChatMode::GuidedSolving => GUIDED_USER,
            ChatMode::RagChat => CHAT_USER_RAG,
            ChatMode::FreeChat => CHAT_USER_FREE,
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} course_name={} syllabus={}",
            self.mode, self.subject, self.has_course_name, self.has_syllabus
        )
    }
}

/// Every template name the selection can return, without duplicates.
pub fn catalog_template_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for key in VariantKey::all() {
        for name in [key.system_template(), key.user_template()] {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
