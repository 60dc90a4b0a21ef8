use serde::Deserialize;
use thiserror::Error;

use crate::links::DEFAULT_REPORT_FORM_URL;
use crate::model::mode::{ModePolicies, ViewMode};
use crate::model::question::FileInfo;

pub const DEFAULT_HEADER_TITLE: &str = "政府採購法題庫";

/// File id that is hidden when `enableSample` is false.
pub const SAMPLE_FILE_ID: &str = "sample";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("malformed manifest: {0}")]
    Malformed(#[from] serde_json::Error),
}

//
// ─── MANIFEST SHAPE ────────────────────────────────────────────────────────────
//

/// The bundled `questions.json` index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub question_files: Vec<QuestionFileEntry>,
    #[serde(default)]
    pub question_list_files: Vec<QuestionGroupEntry>,
    #[serde(default)]
    pub config: ManifestConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFileEntry {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub is_question_file: bool,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionGroupEntry {
    pub type_name: String,
    #[serde(default)]
    pub items: Vec<QuestionListItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListItem {
    #[serde(rename = "series_no")]
    pub series_no: String,
    pub display_name: String,
    pub file: String,
}

/// Static feature flags. Pseudo-categories are on unless explicitly disabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    #[serde(rename = "HomeScreenHeaderTitle", default)]
    pub header_title: Option<String>,
    #[serde(default)]
    pub enable_sample: Option<bool>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub is_wrong: Option<bool>,
    #[serde(default)]
    pub is_mock: Option<bool>,
    #[serde(default)]
    pub is_question_list_file: Option<bool>,
    #[serde(default)]
    pub clear_on_finish: Vec<String>,
    #[serde(default)]
    pub report_form_url: Option<String>,
}

impl ManifestConfig {
    #[must_use]
    pub fn header_title(&self) -> &str {
        self.header_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_HEADER_TITLE)
    }

    #[must_use]
    pub fn favorites_enabled(&self) -> bool {
        self.is_favorite != Some(false)
    }

    #[must_use]
    pub fn wrong_enabled(&self) -> bool {
        self.is_wrong != Some(false)
    }

    #[must_use]
    pub fn mock_enabled(&self) -> bool {
        self.is_mock != Some(false)
    }

    #[must_use]
    pub fn list_mode(&self) -> bool {
        self.is_question_list_file == Some(true)
    }

    #[must_use]
    pub fn report_form_url(&self) -> &str {
        self.report_form_url
            .as_deref()
            .unwrap_or(DEFAULT_REPORT_FORM_URL)
    }

    /// Mode policies with `clearOnFinish` applied. Unknown mode names are ignored.
    #[must_use]
    pub fn mode_policies(&self) -> ModePolicies {
        let modes = self
            .clear_on_finish
            .iter()
            .filter_map(|raw| raw.parse::<ViewMode>().ok());
        ModePolicies::default().with_clear_on_finish(modes)
    }
}

//
// ─── RESOLVED FILES ────────────────────────────────────────────────────────────
//

/// A question file that contributes to the pool, in either manifest layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Series number used as the id prefix of every question in the file.
    pub id: String,
    pub display_name: String,
    pub file_name: Option<String>,
    pub count: Option<u32>,
    pub subject: Option<String>,
}

impl FileEntry {
    /// File-level defaults for raw entries.
    #[must_use]
    pub fn info(&self) -> FileInfo {
        FileInfo {
            test_name: Some(self.display_name.clone()),
            subject: self.subject.clone(),
            series_no: Some(self.id.clone()),
        }
    }
}

impl From<&QuestionFileEntry> for FileEntry {
    fn from(entry: &QuestionFileEntry) -> Self {
        Self {
            id: entry.id.clone(),
            display_name: entry.display_name.clone(),
            file_name: entry.file_name.clone(),
            count: entry.count,
            subject: entry.subject.clone(),
        }
    }
}

impl From<&QuestionListItem> for FileEntry {
    fn from(item: &QuestionListItem) -> Self {
        Self {
            id: item.series_no.clone(),
            display_name: item.display_name.clone(),
            file_name: Some(item.file.clone()),
            count: None,
            subject: None,
        }
    }
}

/// A named group of files (list layout only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub name: String,
    pub files: Vec<FileEntry>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Malformed` if the JSON does not match the manifest shape.
    pub fn from_json_str(raw: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Files shown as standalone categories (flat layout only).
    #[must_use]
    pub fn flat_files(&self) -> Vec<FileEntry> {
        if self.config.list_mode() {
            return Vec::new();
        }
        let hide_sample = self.config.enable_sample == Some(false);
        self.question_files
            .iter()
            .filter(|f| f.is_question_file)
            .filter(|f| !(hide_sample && f.id == SAMPLE_FILE_ID))
            .map(FileEntry::from)
            .collect()
    }

    /// Grouped files (list layout only).
    #[must_use]
    pub fn groups(&self) -> Vec<FileGroup> {
        if !self.config.list_mode() {
            return Vec::new();
        }
        self.question_list_files
            .iter()
            .map(|group| FileGroup {
                name: group.type_name.clone(),
                files: group.items.iter().map(FileEntry::from).collect(),
            })
            .collect()
    }

    /// Every file that makes up the question pool, in manifest order.
    #[must_use]
    pub fn active_files(&self) -> Vec<FileEntry> {
        if self.config.list_mode() {
            self.groups().into_iter().flat_map(|g| g.files).collect()
        } else {
            self.flat_files()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"{
        "questionFiles": [
            {"id": "sample", "displayName": "Sample", "fileName": "sample.json", "isQuestionFile": true},
            {"id": "A001", "displayName": "Law 1", "fileName": "A001.json", "count": 10, "isQuestionFile": true},
            {"id": "draft", "displayName": "Draft", "fileName": "draft.json", "isQuestionFile": false}
        ],
        "config": {"enableSample": false, "isMock": false, "HomeScreenHeaderTitle": "Exam", "clearOnFinish": ["mock", "bogus"]}
    }"#;

    #[test]
    fn flat_layout_filters_sample_and_non_question_files() {
        let manifest = Manifest::from_json_str(FLAT).unwrap();
        let files = manifest.active_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "A001");
        assert_eq!(files[0].count, Some(10));
        assert!(manifest.groups().is_empty());
    }

    #[test]
    fn config_flags_default_to_enabled() {
        let manifest = Manifest::from_json_str(FLAT).unwrap();
        assert!(manifest.config.favorites_enabled());
        assert!(manifest.config.wrong_enabled());
        assert!(!manifest.config.mock_enabled());
        assert_eq!(manifest.config.header_title(), "Exam");
        assert!(manifest.config.mode_policies().get(ViewMode::Mock).clear_on_finish);

        let empty = Manifest::from_json_str("{}").unwrap();
        assert_eq!(empty.config.header_title(), DEFAULT_HEADER_TITLE);
        assert_eq!(empty.config.report_form_url(), DEFAULT_REPORT_FORM_URL);
    }

    #[test]
    fn list_layout_flattens_group_items() {
        let manifest = Manifest::from_json_str(
            r#"{
                "questionFiles": [{"id": "A001", "displayName": "ignored", "isQuestionFile": true}],
                "questionListFiles": [
                    {"typeName": "Civil", "items": [
                        {"series_no": "C1", "displayName": "Civil 1", "file": "C1.json"},
                        {"series_no": "C2", "displayName": "Civil 2", "file": "C2.json"}
                    ]},
                    {"typeName": "Criminal", "items": [
                        {"series_no": "K1", "displayName": "Criminal 1", "file": "K1.json"}
                    ]}
                ],
                "config": {"isQuestionListFile": true}
            }"#,
        )
        .unwrap();

        let ids: Vec<_> = manifest.active_files().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, ["C1", "C2", "K1"]);
        assert_eq!(manifest.groups().len(), 2);
        assert!(manifest.flat_files().is_empty());
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        assert!(Manifest::from_json_str("[1, 2]").is_err());
    }
}
