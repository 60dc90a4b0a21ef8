//! Outbound links for a question: issue report form and web search.

use thiserror::Error;
use url::Url;

use crate::model::{Question, QuestionId};

pub const DEFAULT_REPORT_FORM_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSfnfLFKCPYCRXbY12_xv5abVfvon_FTULBc0FYd4d7xD2A7ZQ/viewform";

/// Form field that receives the question id.
pub const REPORT_FORM_ID_FIELD: &str = "entry.654895695";

pub const SEARCH_URL: &str = "https://www.google.com/search";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinkError {
    #[error("invalid base URL: {0}")]
    InvalidBase(#[from] url::ParseError),
}

/// Pre-filled issue report link for a question.
///
/// # Errors
///
/// Returns `LinkError::InvalidBase` if `form_base` is not a valid URL.
pub fn report_issue_url(form_base: &str, question_id: &QuestionId) -> Result<Url, LinkError> {
    let mut url = Url::parse(form_base)?;
    let has_usp = url.query_pairs().any(|(key, _)| key == "usp");
    {
        let mut query = url.query_pairs_mut();
        if !has_usp {
            query.append_pair("usp", "pp_url");
        }
        query.append_pair(REPORT_FORM_ID_FIELD, question_id.as_str());
    }
    Ok(url)
}

/// Search query made of the question text followed by its labelled options.
#[must_use]
pub fn search_query(question: &Question) -> String {
    let options = question
        .options()
        .iter()
        .map(|(key, text)| format!("{key}.{text}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} {options}", question.content())
}

/// Web search link for "look up this question".
///
/// # Errors
///
/// Returns `LinkError::InvalidBase` if the search base cannot be parsed.
pub fn search_url(question: &Question) -> Result<Url, LinkError> {
    Ok(Url::parse_with_params(
        SEARCH_URL,
        &[("q", search_query(question))],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileInfo, RawQuestion};

    fn question() -> Question {
        let raw: RawQuestion = serde_json::from_str(
            r#"{"Id": 3, "Q": "採購 & 招標?", "A": "是", "B": "否", "Ans": "A"}"#,
        )
        .unwrap();
        raw.into_question(&FileInfo {
            series_no: Some("A001".into()),
            ..FileInfo::default()
        })
    }

    #[test]
    fn report_link_carries_encoded_question_id() {
        let id: QuestionId = "A 001_3".parse().unwrap();
        let url = report_issue_url(DEFAULT_REPORT_FORM_URL, &id).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("usp".into(), "pp_url".into())));
        assert!(pairs.contains(&(REPORT_FORM_ID_FIELD.into(), "A 001_3".into())));
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn report_link_rejects_bad_base() {
        let id = QuestionId::compose("A001", "1");
        assert!(report_issue_url("not a url", &id).is_err());
    }

    #[test]
    fn search_link_includes_content_and_options() {
        let q = question();
        assert_eq!(search_query(&q), "採購 & 招標? A.是 B.否");

        let url = search_url(&q).unwrap();
        assert_eq!(url.host_str(), Some("www.google.com"));
        let (_, value) = url.query_pairs().find(|(k, _)| k == "q").unwrap();
        assert_eq!(value, "採購 & 招標? A.是 B.否");
    }
}
