use std::collections::{HashMap, HashSet};

use crate::model::ids::QuestionId;

/// Per-question answer history.
///
/// There is exactly one record per question id; submissions and favourite
/// toggles both mutate the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    question_id: QuestionId,
    is_answered: bool,
    is_correct: bool,
    selected_answer: Option<String>,
    is_favorite: bool,
    wrong_count: u32,
}

impl AnswerRecord {
    /// A blank record: unanswered, not a favourite, never wrong.
    #[must_use]
    pub fn new(question_id: QuestionId) -> Self {
        Self {
            question_id,
            is_answered: false,
            is_correct: false,
            selected_answer: None,
            is_favorite: false,
            wrong_count: 0,
        }
    }

    /// Rehydrate a record from storage.
    #[must_use]
    pub fn from_persisted(
        question_id: QuestionId,
        is_answered: bool,
        is_correct: bool,
        selected_answer: Option<String>,
        is_favorite: bool,
        wrong_count: u32,
    ) -> Self {
        Self {
            question_id,
            is_answered,
            is_correct,
            selected_answer,
            is_favorite,
            wrong_count,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_answered
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Ever answered incorrectly and not correct right now.
    #[must_use]
    pub fn is_wrong(&self) -> bool {
        self.wrong_count > 0 && !self.is_correct
    }

    /// Record a submission. The wrong count only ever grows.
    pub fn apply_submission(&mut self, selected: impl Into<String>, correct: bool) {
        self.is_answered = true;
        self.is_correct = correct;
        self.selected_answer = Some(selected.into());
        if !correct {
            self.wrong_count = self.wrong_count.saturating_add(1);
        }
    }

    /// Flip the favourite flag and return the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.is_favorite = !self.is_favorite;
        self.is_favorite
    }
}

/// Snapshot of every stored answer record, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBook {
    records: HashMap<QuestionId, AnswerRecord>,
}

impl AnswerBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&AnswerRecord> {
        self.records.get(id)
    }

    /// The stored record, or a blank one when the question has no history.
    #[must_use]
    pub fn record_or_default(&self, id: &QuestionId) -> AnswerRecord {
        self.records
            .get(id)
            .cloned()
            .unwrap_or_else(|| AnswerRecord::new(id.clone()))
    }

    pub fn insert(&mut self, record: AnswerRecord) {
        self.records.insert(record.question_id.clone(), record);
    }

    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a QuestionId>) {
        for id in ids {
            self.records.remove(id);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn is_favorite(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(AnswerRecord::is_favorite)
    }

    #[must_use]
    pub fn is_wrong(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(AnswerRecord::is_wrong)
    }

    #[must_use]
    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(AnswerRecord::is_answered)
    }

    /// Favourites whose question is still part of `known`.
    #[must_use]
    pub fn count_favorites(&self, known: &HashSet<QuestionId>) -> usize {
        self.records()
            .filter(|r| r.is_favorite() && known.contains(r.question_id()))
            .count()
    }

    /// Wrong answers whose question is still part of `known`.
    #[must_use]
    pub fn count_wrong(&self, known: &HashSet<QuestionId>) -> usize {
        self.records()
            .filter(|r| r.is_wrong() && known.contains(r.question_id()))
            .count()
    }
}

impl FromIterator<AnswerRecord> for AnswerBook {
    fn from_iter<T: IntoIterator<Item = AnswerRecord>>(iter: T) -> Self {
        let mut book = Self::new();
        for record in iter {
            book.insert(record);
        }
        book
    }
}
