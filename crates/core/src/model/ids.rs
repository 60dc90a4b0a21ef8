use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Question, formatted as `{series_no}_{Id}`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Builds an id from the series number and the raw per-file id.
    #[must_use]
    pub fn compose(series_no: &str, raw_id: &str) -> Self {
        Self(format!("{series_no}_{raw_id}"))
    }

    /// Rebuilds an id read back from storage without re-validating its shape.
    #[must_use]
    pub fn from_persisted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The series part of the id (everything before the last `_`).
    #[must_use]
    pub fn series_no(&self) -> &str {
        self.0.rsplit_once('_').map_or("", |(series, _)| series)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing an id from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse QuestionId from {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.rsplit_once('_') {
            Some((series, id)) if !series.is_empty() && !id.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(ParseIdError { raw: s.to_owned() }),
        }
    }
}
