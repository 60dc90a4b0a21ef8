use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::model::ids::QuestionId;

//
// ─── OPTION KEYS ───────────────────────────────────────────────────────────────
//

/// Letter of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
    E,
}

impl OptionKey {
    pub const ALL: [OptionKey; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Parses a single option letter, case-insensitive.
    #[must_use]
    pub fn from_letter(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins a selection as a sorted, de-duplicated, comma-separated string.
///
/// Selecting `{B, A}` and `{A, B}` both yield `"A,B"`.
#[must_use]
pub fn normalize_answer(keys: impl IntoIterator<Item = OptionKey>) -> String {
    keys.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(OptionKey::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Normalizes a canonical answer string from content.
///
/// Answers made only of option letters are sorted and upper-cased; anything
/// else is kept as trimmed text.
#[must_use]
pub fn normalize_answer_text(raw: &str) -> String {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    let keys: Option<Vec<OptionKey>> = parts.iter().map(|p| OptionKey::from_letter(p)).collect();
    match keys {
        Some(keys) if !keys.is_empty() => normalize_answer(keys),
        _ => raw.trim().to_owned(),
    }
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionType {
    #[default]
    SingleChoice,
    MultiChoice,
    TrueFalse,
    Open,
}

impl QuestionType {
    /// Maps a content type tag; unknown or missing tags fall back to single choice.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("複選題" | "multi" | "multiple") => Self::MultiChoice,
            Some("是非題" | "true_false") => Self::TrueFalse,
            Some("問答題" | "open") => Self::Open,
            _ => Self::SingleChoice,
        }
    }

    #[must_use]
    pub fn is_multi(self) -> bool {
        matches!(self, Self::MultiChoice)
    }

    /// Open questions have no options to pick from.
    #[must_use]
    pub fn is_selectable(self) -> bool {
        !matches!(self, Self::Open)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable exam question loaded from static content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    content: String,
    options: Vec<(OptionKey, String)>,
    answer: String,
    explanation: String,
    kind: QuestionType,
    test_name: Option<String>,
    subject: Option<String>,
    series_no: String,
    question_number: u32,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Non-empty options in letter order.
    #[must_use]
    pub fn options(&self) -> &[(OptionKey, String)] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, key: OptionKey) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| text.as_str())
    }

    /// Canonical answer, comma-joined for multi-choice.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    #[must_use]
    pub fn test_name(&self) -> Option<&str> {
        self.test_name.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn series_no(&self) -> &str {
        &self.series_no
    }

    #[must_use]
    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    /// Compares a submitted answer string against the canonical answer.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        normalize_answer_text(selected) == self.answer
    }
}

//
// ─── RAW CONTENT ───────────────────────────────────────────────────────────────
//

/// Question id as it appears in content files (numbers or strings).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// One entry of a question file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(rename = "Id")]
    pub id: RawId,
    #[serde(rename = "Q", alias = "content", default)]
    pub content: String,
    #[serde(rename = "A", default)]
    pub a: Option<String>,
    #[serde(rename = "B", default)]
    pub b: Option<String>,
    #[serde(rename = "C", default)]
    pub c: Option<String>,
    #[serde(rename = "D", default)]
    pub d: Option<String>,
    #[serde(rename = "E", default)]
    pub e: Option<String>,
    #[serde(rename = "Ans", default)]
    pub answer: String,
    #[serde(rename = "Exp", alias = "exp", default)]
    pub explanation: String,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "testName", default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub series_no: Option<String>,
}

/// File-level defaults applied to raw entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub test_name: Option<String>,
    pub subject: Option<String>,
    pub series_no: Option<String>,
}

impl FileInfo {
    /// Parses `testName_subject_seriesNo.json` style file names.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
        let mut parts = stem.split('_');
        let test_name = parts.next().filter(|s| !s.is_empty()).unwrap_or("未分類");
        let subject = parts.next().unwrap_or_default();
        let series_no = parts.next().filter(|s| !s.is_empty()).unwrap_or("1");
        Self {
            test_name: Some(test_name.to_owned()),
            subject: Some(subject.to_owned()),
            series_no: Some(series_no.to_owned()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl RawQuestion {
    /// `false` for entries whose `Id` is blank; those cannot be keyed.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.to_string().is_empty()
    }

    /// Normalizes the raw entry into a `Question`, falling back to file-level info.
    #[must_use]
    pub fn into_question(self, info: &FileInfo) -> Question {
        let series_no = non_empty(self.series_no)
            .or_else(|| non_empty(info.series_no.clone()))
            .unwrap_or_else(|| "default".to_owned());
        let raw_id = self.id.to_string();
        let question_number = raw_id.parse::<u32>().unwrap_or(0);

        let options = OptionKey::ALL
            .into_iter()
            .zip([self.a, self.b, self.c, self.d, self.e])
            .filter_map(|(key, text)| non_empty(text).map(|text| (key, text)))
            .collect();

        Question {
            id: QuestionId::compose(&series_no, &raw_id),
            content: self.content,
            options,
            answer: normalize_answer_text(&self.answer),
            explanation: self.explanation,
            kind: QuestionType::from_tag(self.kind.as_deref()),
            test_name: non_empty(self.test_name).or_else(|| info.test_name.clone()),
            subject: non_empty(self.subject).or_else(|| info.subject.clone()),
            series_no,
            question_number,
        }
    }
}
