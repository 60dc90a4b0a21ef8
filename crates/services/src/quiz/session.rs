use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerBook, AnswerRecord, ModePolicy, OptionKey, Question, QuestionType, QuizOutcome,
    QuizScore, QuizSummary, SessionKey, ViewMode, normalize_answer,
};

use super::progress::QuizProgress;
use crate::error::QuizError;
use crate::launcher::QuizLaunch;

//
// ─── STEP TYPES ────────────────────────────────────────────────────────────────
//

/// Whether the current question's answer is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Unanswered,
    Submitted,
}

/// An answer awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub question_index: usize,
    pub answer: String,
    pub is_correct: bool,
}

/// Result of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    /// Stepped past the last question; the session is now finished.
    End,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz over a question list frozen at entry.
///
/// Favourite and wrong sessions filter the launched pool against the answer
/// snapshot once; toggling a favourite or fixing a wrong answer later does
/// not change the list until the next launch.
pub struct QuizSession {
    title: String,
    mode: ViewMode,
    session_key: SessionKey,
    policy: ModePolicy,
    questions: Vec<Question>,
    answers: AnswerBook,
    current: usize,
    phase: Phase,
    selection: BTreeSet<OptionKey>,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl QuizSession {
    /// Build a session from a launch and the current answer snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if no question survives the mode filter.
    pub fn new(
        launch: QuizLaunch,
        answers: AnswerBook,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let QuizLaunch {
            title,
            mode,
            session_key,
            policy,
            questions,
            start_index,
        } = launch;

        let questions: Vec<Question> = match mode {
            ViewMode::Favorite => questions
                .into_iter()
                .filter(|q| answers.is_favorite(q.id()))
                .collect(),
            ViewMode::Wrong => questions
                .into_iter()
                .filter(|q| answers.is_wrong(q.id()))
                .collect(),
            ViewMode::Review => questions
                .into_iter()
                .filter(|q| answers.is_answered(q.id()))
                .collect(),
            ViewMode::Quiz | ViewMode::Mock => questions,
        };
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        let current = if start_index < questions.len() {
            start_index
        } else {
            0
        };

        let mut session = Self {
            title,
            mode,
            session_key,
            policy,
            questions,
            answers,
            current,
            phase: Phase::Unanswered,
            selection: BTreeSet::new(),
            started_at,
            finished: false,
        };
        session.enter_current();
        Ok(session)
    }

    fn enter_current(&mut self) {
        self.phase = Phase::Unanswered;
        self.selection.clear();
        if !self.mode.is_review() {
            return;
        }
        let question = &self.questions[self.current];
        let Some(record) = self.answers.get(question.id()).filter(|r| r.is_answered()) else {
            return;
        };
        self.phase = Phase::Submitted;
        if let Some(stored) = record.selected_answer() {
            self.selection = stored
                .split(',')
                .filter_map(|part| OptionKey::from_letter(part.trim()))
                .collect();
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    #[must_use]
    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; empty sessions cannot be built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    /// Stored history for the current question, if any.
    #[must_use]
    pub fn current_record(&self) -> Option<&AnswerRecord> {
        self.answers.get(self.current_question().id())
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerBook {
        &self.answers
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pending (or restored) option letters in A..E order.
    #[must_use]
    pub fn selection(&self) -> Vec<OptionKey> {
        self.selection.iter().copied().collect()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            index: self.current,
            total: self.questions.len(),
            answered: self
                .questions
                .iter()
                .filter(|q| self.answers.is_answered(q.id()))
                .count(),
            is_finished: self.finished,
        }
    }

    fn ensure_active(&self) -> Result<(), QuizError> {
        if self.finished {
            Err(QuizError::Finished)
        } else {
            Ok(())
        }
    }

    fn ensure_answerable(&self) -> Result<&Question, QuizError> {
        self.ensure_active()?;
        if self.mode.is_review() {
            return Err(QuizError::ReadOnly);
        }
        Ok(self.current_question())
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Pick an option. Single-choice and true/false questions submit at once;
    /// multi-choice questions toggle the pending selection and return `None`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the session is read-only or finished, the
    /// question has no such option, or it was already submitted.
    pub fn choose(&mut self, key: OptionKey) -> Result<Option<Submission>, QuizError> {
        let question = self.ensure_answerable()?;
        let kind = question.kind();
        if !kind.is_selectable() {
            return Err(QuizError::NotSelectable);
        }
        if question.option(key).is_none() {
            return Err(QuizError::UnknownOption(key));
        }
        if self.phase == Phase::Submitted {
            return Err(QuizError::AlreadySubmitted);
        }

        if kind == QuestionType::MultiChoice {
            if !self.selection.remove(&key) {
                self.selection.insert(key);
            }
            return Ok(None);
        }

        self.selection = BTreeSet::from([key]);
        Ok(Some(self.submission(key.as_str().to_owned())))
    }

    /// Submit the pending multi-choice selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the question is not multi-choice, the selection
    /// is empty, or the question was already submitted.
    pub fn submit_selection(&mut self) -> Result<Submission, QuizError> {
        let question = self.ensure_answerable()?;
        if !question.kind().is_multi() {
            return Err(QuizError::NotMultiChoice);
        }
        if self.phase == Phase::Submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.selection.is_empty() {
            return Err(QuizError::EmptySelection);
        }
        Ok(self.submission(normalize_answer(self.selection.iter().copied())))
    }

    fn submission(&self, answer: String) -> Submission {
        let is_correct = self.current_question().is_correct(&answer);
        Submission {
            question_index: self.current,
            answer,
            is_correct,
        }
    }

    /// Show the reference answer of an open question without recording anything.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotRevealable` for option-based questions.
    pub fn reveal(&mut self) -> Result<(), QuizError> {
        self.ensure_active()?;
        if self.current_question().kind() != QuestionType::Open {
            return Err(QuizError::NotRevealable);
        }
        self.phase = Phase::Submitted;
        Ok(())
    }

    /// Refresh the snapshot with a persisted record.
    pub fn apply(&mut self, record: AnswerRecord) {
        self.answers.insert(record);
    }

    /// Apply a persisted submission and show its answer if it is still current.
    pub(crate) fn commit(&mut self, submission: &Submission, record: AnswerRecord) {
        self.apply(record);
        if submission.question_index == self.current {
            self.phase = Phase::Submitted;
        }
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Jump to `index`; returns whether the position changed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::OutOfRange` for an index past the end.
    pub fn go_to(&mut self, index: usize) -> Result<bool, QuizError> {
        self.ensure_active()?;
        if index >= self.questions.len() {
            return Err(QuizError::OutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        if index == self.current {
            return Ok(false);
        }
        self.current = index;
        self.enter_current();
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Finished` if the session already ended.
    pub fn next(&mut self) -> Result<Advance, QuizError> {
        self.ensure_active()?;
        let next = self.current + 1;
        if next < self.questions.len() {
            self.go_to(next)?;
            Ok(Advance::Moved(next))
        } else {
            self.finished = true;
            Ok(Advance::End)
        }
    }

    /// Step back; returns whether the position changed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` if the session already ended.
    pub fn prev(&mut self) -> Result<bool, QuizError> {
        self.ensure_active()?;
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => Ok(false),
        }
    }

    //
    // ─── RESULT ────────────────────────────────────────────────────────────────
    //

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Questions of this session whose latest stored answer is correct.
    #[must_use]
    pub fn score(&self) -> QuizScore {
        let correct = self
            .questions
            .iter()
            .filter(|q| self.answers.get(q.id()).is_some_and(AnswerRecord::is_correct))
            .count();
        QuizScore::from_counts(correct, self.questions.len())
    }

    #[must_use]
    pub fn outcome(&self, completed_at: DateTime<Utc>) -> QuizOutcome {
        if self.mode.is_review() {
            return QuizOutcome::ReviewAcknowledged;
        }
        QuizOutcome::Scored(QuizSummary {
            title: self.title.clone(),
            mode: self.mode,
            score: self.score(),
            started_at: self.started_at,
            completed_at,
        })
    }
}
