//! Read-only question content bundled with the application.
//!
//! A bundle is a `questions.json` manifest plus one JSON file per question
//! set. A question file is either a bare array of entries or an object with
//! a `questions` array.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quiz_core::model::{Manifest, ManifestError, RawQuestion};
use serde::Deserialize;
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "questions.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content file not found: {0}")]
    Missing(String),

    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question file {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Source of the manifest and question files.
pub trait ContentSource: Send + Sync {
    /// Load the manifest.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the manifest is missing or malformed.
    fn manifest(&self) -> Result<Manifest, ContentError>;

    /// Load the raw entries of one question file.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the file is missing, unreadable or malformed.
    fn load_file(&self, file_name: &str) -> Result<Vec<RawQuestion>, ContentError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFileShape {
    Bare(Vec<RawQuestion>),
    Wrapped { questions: Vec<RawQuestion> },
}

/// Parse a question file in either accepted shape.
///
/// # Errors
///
/// Returns `ContentError::Malformed` if the text matches neither shape.
pub fn parse_question_file(file_name: &str, raw: &str) -> Result<Vec<RawQuestion>, ContentError> {
    let shape: QuestionFileShape =
        serde_json::from_str(raw).map_err(|source| ContentError::Malformed {
            file: file_name.to_owned(),
            source,
        })?;
    Ok(match shape {
        QuestionFileShape::Bare(questions) | QuestionFileShape::Wrapped { questions } => questions,
    })
}

//
// ─── DIRECTORY ─────────────────────────────────────────────────────────────────
//

/// Content read from a directory holding `questions.json` and the question files.
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    root: PathBuf,
}

impl DirectoryContent {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, file_name: &str) -> Result<String, ContentError> {
        let path = self.root.join(file_name);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ContentError::Missing(file_name.to_owned())
            } else {
                ContentError::Io {
                    file: file_name.to_owned(),
                    source,
                }
            }
        })
    }
}

impl ContentSource for DirectoryContent {
    fn manifest(&self) -> Result<Manifest, ContentError> {
        let raw = self.read(MANIFEST_FILE_NAME)?;
        Ok(Manifest::from_json_str(&raw)?)
    }

    fn load_file(&self, file_name: &str) -> Result<Vec<RawQuestion>, ContentError> {
        let raw = self.read(file_name)?;
        parse_question_file(file_name, &raw)
    }
}

//
// ─── IN MEMORY ─────────────────────────────────────────────────────────────────
//

/// Content held in memory, keyed by file name. Handy for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    manifest: String,
    files: HashMap<String, String>,
}

impl InMemoryContent {
    #[must_use]
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            files: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, file_name: impl Into<String>, json: impl Into<String>) -> Self {
        self.files.insert(file_name.into(), json.into());
        self
    }
}

impl ContentSource for InMemoryContent {
    fn manifest(&self) -> Result<Manifest, ContentError> {
        Ok(Manifest::from_json_str(&self.manifest)?)
    }

    fn load_file(&self, file_name: &str) -> Result<Vec<RawQuestion>, ContentError> {
        let raw = self
            .files
            .get(file_name)
            .ok_or_else(|| ContentError::Missing(file_name.to_owned()))?;
        parse_question_file(file_name, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_wrapped_files() {
        let bare = parse_question_file("a.json", r#"[{"Id": 1, "Q": "x", "Ans": "A"}]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped = parse_question_file(
            "b.json",
            r#"{"questions": [{"Id": 1, "Q": "x", "Ans": "A"}, {"Id": "2", "Q": "y", "Ans": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn rejects_other_shapes() {
        let err = parse_question_file("c.json", r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ContentError::Malformed { .. }));
    }

    #[test]
    fn in_memory_reports_missing_files() {
        let content = InMemoryContent::new("{}").with_file("a.json", "[]");
        assert!(content.load_file("a.json").unwrap().is_empty());
        assert!(matches!(
            content.load_file("nope.json"),
            Err(ContentError::Missing(_))
        ));
        assert!(content.manifest().unwrap().question_files.is_empty());
    }

    #[test]
    fn directory_reads_manifest_and_files() {
        let dir = std::env::temp_dir().join(format!("quiz-content-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(MANIFEST_FILE_NAME),
            r#"{"questionFiles": [{"id": "A001", "displayName": "Law", "fileName": "A001.json", "isQuestionFile": true}]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("A001.json"), r#"[{"Id": 1, "Q": "x", "Ans": "A"}]"#).unwrap();

        let content = DirectoryContent::new(&dir);
        assert_eq!(content.manifest().unwrap().active_files().len(), 1);
        assert_eq!(content.load_file("A001.json").unwrap().len(), 1);
        assert!(matches!(
            content.load_file("missing.json"),
            Err(ContentError::Missing(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
