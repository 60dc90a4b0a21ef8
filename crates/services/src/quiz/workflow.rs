use std::sync::Arc;

use log::{debug, info};
use quiz_core::links::{self, DEFAULT_REPORT_FORM_URL};
use quiz_core::model::{AnswerRecord, OptionKey, QuizOutcome, ViewMode};
use storage::repository::{AnswerRepository, CompletionRepository, ProgressRepository};
use url::Url;

use super::session::{Advance, QuizSession, Submission};
use crate::Clock;
use crate::error::QuizError;
use crate::launcher::QuizLaunch;

/// Result of picking an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Multi-choice selection after the toggle.
    Toggled(Vec<OptionKey>),
    /// The answer was stored; carries the merged record.
    Submitted(AnswerRecord),
}

/// Result of advancing.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Moved(usize),
    Finished(QuizOutcome),
}

/// Orchestrates quiz sessions against answer, progress and completion storage.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    answers: Arc<dyn AnswerRepository>,
    progress: Arc<dyn ProgressRepository>,
    completion: Arc<dyn CompletionRepository>,
    report_form_url: String,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        answers: Arc<dyn AnswerRepository>,
        progress: Arc<dyn ProgressRepository>,
        completion: Arc<dyn CompletionRepository>,
    ) -> Self {
        Self {
            clock,
            answers,
            progress,
            completion,
            report_form_url: DEFAULT_REPORT_FORM_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_report_form_url(mut self, url: impl Into<String>) -> Self {
        self.report_form_url = url.into();
        self
    }

    /// Open a session for a launch and record the entry position.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if the frozen list is empty, or
    /// `QuizError::Storage` if stored state cannot be read or written.
    pub async fn start(&self, launch: QuizLaunch) -> Result<QuizSession, QuizError> {
        let answers = self.answers.load_answers().await?;
        let session = QuizSession::new(launch, answers, self.clock.now())?;
        self.persist_index(&session).await?;
        Ok(session)
    }

    /// Pick an option, storing the answer when it completes a submission.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for invalid picks or persistence failures.
    pub async fn choose(
        &self,
        session: &mut QuizSession,
        key: OptionKey,
    ) -> Result<ChoiceOutcome, QuizError> {
        match session.choose(key)? {
            None => Ok(ChoiceOutcome::Toggled(session.selection())),
            Some(submission) => self
                .persist_submission(session, submission)
                .await
                .map(ChoiceOutcome::Submitted),
        }
    }

    /// Submit the pending multi-choice selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for invalid submissions or persistence failures.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<AnswerRecord, QuizError> {
        let submission = session.submit_selection()?;
        self.persist_submission(session, submission).await
    }

    async fn persist_submission(
        &self,
        session: &mut QuizSession,
        submission: Submission,
    ) -> Result<AnswerRecord, QuizError> {
        let mut record = session
            .answers()
            .record_or_default(session.current_question().id());
        record.apply_submission(submission.answer.clone(), submission.is_correct);
        self.answers.upsert_answer(&record).await?;

        if session.mode() == ViewMode::Quiz {
            let reached = submission.question_index + 1;
            let stored = self
                .progress
                .load_progress()
                .await?
                .get(session.session_key());
            if reached > stored {
                self.progress
                    .save_progress(session.session_key(), reached)
                    .await?;
            }
        }

        session.commit(&submission, record.clone());
        Ok(record)
    }

    /// Flip the favourite flag of the current question and store it at once.
    /// The session's question list is left as is.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the record cannot be stored.
    pub async fn toggle_favorite(&self, session: &mut QuizSession) -> Result<bool, QuizError> {
        if session.is_finished() {
            return Err(QuizError::Finished);
        }
        let mut record = session
            .answers()
            .record_or_default(session.current_question().id());
        let favorite = record.toggle_favorite();
        self.answers.upsert_answer(&record).await?;
        session.apply(record);
        Ok(favorite)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Move forward, or finish the session past the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the session already ended or storage fails.
    pub async fn next(&self, session: &mut QuizSession) -> Result<StepOutcome, QuizError> {
        match session.next()? {
            Advance::Moved(index) => {
                self.persist_index(session).await?;
                Ok(StepOutcome::Moved(index))
            }
            Advance::End => self.finish(session).await.map(StepOutcome::Finished),
        }
    }

    /// # Errors
    ///
    /// Returns `QuizError` if the session already ended or storage fails.
    pub async fn prev(&self, session: &mut QuizSession) -> Result<bool, QuizError> {
        let moved = session.prev()?;
        if moved {
            self.persist_index(session).await?;
        }
        Ok(moved)
    }

    /// # Errors
    ///
    /// Returns `QuizError` for an out-of-range index or storage failures.
    pub async fn go_to(&self, session: &mut QuizSession, index: usize) -> Result<bool, QuizError> {
        let moved = session.go_to(index)?;
        if moved {
            self.persist_index(session).await?;
        }
        Ok(moved)
    }

    async fn persist_index(&self, session: &QuizSession) -> Result<(), QuizError> {
        if !session.policy().persists_progress {
            return Ok(());
        }
        self.progress
            .save_progress(session.session_key(), session.index())
            .await?;
        debug!("progress {} -> {}", session.session_key(), session.index());
        Ok(())
    }

    /// End the session. Scored sessions reset their progress to zero and a
    /// standard quiz marks its category completed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the reset or completion flag cannot be stored.
    pub async fn finish(&self, session: &mut QuizSession) -> Result<QuizOutcome, QuizError> {
        session.mark_finished();
        let outcome = session.outcome(self.clock.now());
        if let QuizOutcome::Scored(summary) = &outcome {
            self.progress.save_progress(session.session_key(), 0).await?;
            if session.mode() == ViewMode::Quiz {
                self.completion.mark_completed(session.title()).await?;
            }
            info!(
                "finished {} ({}): {}/{} correct",
                summary.title, summary.mode, summary.score.correct, summary.score.total
            );
        }
        Ok(outcome)
    }

    //
    // ─── LINKS ─────────────────────────────────────────────────────────────────
    //

    /// Issue report form pre-filled with the current question id.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Link` if the configured form URL is invalid.
    pub fn report_url(&self, session: &QuizSession) -> Result<Url, QuizError> {
        Ok(links::report_issue_url(
            &self.report_form_url,
            session.current_question().id(),
        )?)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Link` if the search URL cannot be built.
    pub fn search_url(&self, session: &QuizSession) -> Result<Url, QuizError> {
        Ok(links::search_url(session.current_question())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{FileInfo, ModePolicies, Question, SessionKey};
    use quiz_core::time::fixed_now;
    use storage::content::parse_question_file;
    use storage::repository::Storage;

    fn questions(n: usize) -> Vec<Question> {
        let entries: Vec<String> = (1..=n)
            .map(|i| format!(r#"{{"Id": {i}, "Q": "q{i}", "A": "yes", "B": "no", "Ans": "A"}}"#))
            .collect();
        let info = FileInfo {
            series_no: Some("A001".into()),
            ..FileInfo::default()
        };
        parse_question_file("A001.json", &format!("[{}]", entries.join(",")))
            .unwrap()
            .into_iter()
            .map(|raw| raw.into_question(&info))
            .collect()
    }

    fn launch(mode: ViewMode, n: usize, start_index: usize) -> QuizLaunch {
        QuizLaunch {
            title: "Law 1".into(),
            mode,
            session_key: SessionKey::for_mode(mode, "Law 1"),
            policy: ModePolicies::default().get(mode),
            questions: questions(n),
            start_index,
        }
    }

    fn service(storage: &Storage) -> QuizLoopService {
        QuizLoopService::new(
            Clock::fixed(fixed_now()),
            Arc::clone(&storage.answers),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.completion),
        )
    }

    async fn stored_progress(storage: &Storage, mode: ViewMode) -> usize {
        storage
            .progress
            .load_progress()
            .await
            .unwrap()
            .get(&SessionKey::for_mode(mode, "Law 1"))
    }

    #[tokio::test]
    async fn quiz_submission_raises_progress() {
        let storage = Storage::in_memory();
        let svc = service(&storage);
        let mut session = svc.start(launch(ViewMode::Quiz, 3, 1)).await.unwrap();
        assert_eq!(stored_progress(&storage, ViewMode::Quiz).await, 1);

        let outcome = svc.choose(&mut session, OptionKey::B).await.unwrap();
        let ChoiceOutcome::Submitted(record) = outcome else {
            panic!("single choice submits");
        };
        assert_eq!(record.wrong_count(), 1);
        assert_eq!(stored_progress(&storage, ViewMode::Quiz).await, 2);

        svc.prev(&mut session).await.unwrap();
        assert_eq!(stored_progress(&storage, ViewMode::Quiz).await, 0);
    }

    #[tokio::test]
    async fn finishing_a_quiz_scores_and_marks_completion() {
        let storage = Storage::in_memory();
        let svc = service(&storage);
        let mut session = svc.start(launch(ViewMode::Quiz, 2, 0)).await.unwrap();

        svc.choose(&mut session, OptionKey::A).await.unwrap();
        assert_eq!(svc.next(&mut session).await.unwrap(), StepOutcome::Moved(1));
        svc.choose(&mut session, OptionKey::B).await.unwrap();
        let StepOutcome::Finished(QuizOutcome::Scored(summary)) = svc.next(&mut session).await.unwrap()
        else {
            panic!("quiz sessions are scored");
        };

        assert_eq!((summary.score.correct, summary.score.total), (1, 2));
        assert_eq!(summary.score.percent, 50);
        assert_eq!(summary.completed_at, fixed_now());
        assert_eq!(stored_progress(&storage, ViewMode::Quiz).await, 0);
        assert!(storage.completion.load_completed().await.unwrap().is_completed("Law 1"));
        assert!(matches!(svc.next(&mut session).await, Err(QuizError::Finished)));
    }

    #[tokio::test]
    async fn mock_finish_does_not_mark_completion() {
        let storage = Storage::in_memory();
        let svc = service(&storage);
        let mut session = svc.start(launch(ViewMode::Mock, 1, 0)).await.unwrap();
        svc.choose(&mut session, OptionKey::A).await.unwrap();
        assert_eq!(stored_progress(&storage, ViewMode::Mock).await, 0);

        let outcome = svc.next(&mut session).await.unwrap();
        assert!(matches!(outcome, StepOutcome::Finished(QuizOutcome::Scored(_))));
        assert!(!storage.completion.load_completed().await.unwrap().is_completed("Law 1"));
    }

    #[tokio::test]
    async fn review_is_not_persisted() {
        let storage = Storage::in_memory();
        for raw in ["A001_1", "A001_2"] {
            let mut record = AnswerRecord::new(raw.parse().unwrap());
            record.apply_submission("A", true);
            storage.answers.upsert_answer(&record).await.unwrap();
        }
        let svc = service(&storage);
        let mut session = svc.start(launch(ViewMode::Review, 3, 0)).await.unwrap();
        assert_eq!(session.len(), 2);

        assert_eq!(svc.next(&mut session).await.unwrap(), StepOutcome::Moved(1));
        assert_eq!(
            svc.next(&mut session).await.unwrap(),
            StepOutcome::Finished(QuizOutcome::ReviewAcknowledged)
        );
        assert!(
            storage
                .progress
                .load_progress()
                .await
                .unwrap()
                .iter()
                .next()
                .is_none()
        );
        assert!(!storage.completion.load_completed().await.unwrap().is_completed("Law 1"));
    }

    #[tokio::test]
    async fn favorite_toggle_persists_immediately() {
        let storage = Storage::in_memory();
        let svc = service(&storage);
        let mut session = svc.start(launch(ViewMode::Quiz, 2, 0)).await.unwrap();

        assert!(svc.toggle_favorite(&mut session).await.unwrap());
        let book = storage.answers.load_answers().await.unwrap();
        assert!(book.is_favorite(&"A001_1".parse().unwrap()));
        assert!(!book.is_answered(&"A001_1".parse().unwrap()));

        assert!(!svc.toggle_favorite(&mut session).await.unwrap());
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn links_target_the_current_question() {
        let storage = Storage::in_memory();
        let svc = service(&storage).with_report_form_url("https://example.com/form?usp=pp_url");
        let session = svc.start(launch(ViewMode::Quiz, 1, 0)).await.unwrap();

        let report = svc.report_url(&session).unwrap();
        assert_eq!(report.host_str(), Some("example.com"));
        assert!(report.query_pairs().any(|(k, v)| k == "entry.654895695" && v == "A001_1"));
        assert_eq!(report.query_pairs().filter(|(k, _)| k == "usp").count(), 1);

        let search = svc.search_url(&session).unwrap();
        assert!(search.query_pairs().any(|(k, v)| k == "q" && v == "q1 A.yes B.no"));
    }
}
