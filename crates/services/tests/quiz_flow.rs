use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::{MOCK_EXAM_SIZE, OptionKey, PrimaryAction, QuizOutcome, ViewMode};
use quiz_core::time::fixed_now;
use services::{AppServices, ChoiceOutcome, Clock, QuizError, StepOutcome};
use storage::content::InMemoryContent;
use storage::repository::Storage;

fn questions_json(series: &str, n: usize) -> String {
    let entries: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"Id": {i}, "Q": "{series} q{i}", "A": "yes", "B": "no", "Ans": "A", "series_no": "{series}"}}"#
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}

fn content(files: &[(&str, usize)]) -> InMemoryContent {
    let entries: Vec<String> = files
        .iter()
        .map(|(series, _)| {
            format!(
                r#"{{"id": "{series}", "displayName": "Law {series}", "fileName": "{series}.json", "isQuestionFile": true}}"#
            )
        })
        .collect();
    let manifest = format!(r#"{{"questionFiles": [{}]}}"#, entries.join(","));
    files
        .iter()
        .fold(InMemoryContent::new(manifest), |content, (series, n)| {
            content.with_file(format!("{series}.json"), questions_json(series, *n))
        })
}

fn services(storage: &Storage, files: &[(&str, usize)]) -> AppServices {
    AppServices::new(storage, Arc::new(content(files)), Clock::fixed(fixed_now())).unwrap()
}

async fn play_through(app: &AppServices, category_id: &str, picks: &[OptionKey]) -> QuizOutcome {
    let category = app.catalog().find_category(category_id).await.unwrap();
    let launch = app.launcher().launch(&category, ViewMode::Quiz).await.unwrap();
    let quiz = app.quiz_loop();
    let mut session = quiz.start(launch).await.unwrap();
    for pick in picks {
        quiz.choose(&mut session, *pick).await.unwrap();
        if let StepOutcome::Finished(outcome) = quiz.next(&mut session).await.unwrap() {
            return outcome;
        }
    }
    panic!("session did not finish");
}

#[tokio::test]
async fn completed_quiz_shows_full_and_restarts_clean() {
    let storage = Storage::in_memory();
    let app = services(&storage, &[("A001", 3)]);

    let outcome = play_through(&app, "A001", &[OptionKey::A, OptionKey::B, OptionKey::A]).await;
    let QuizOutcome::Scored(summary) = outcome else {
        panic!("quiz sessions are scored");
    };
    assert_eq!((summary.score.correct, summary.score.total), (2, 3));
    assert_eq!(summary.score.percent, 67);

    let home = app.catalog().home().await.unwrap();
    let card = home.find("A001").unwrap();
    assert!(card.is_completed);
    assert_eq!(card.progress, 0);
    assert_eq!(card.display_progress, 3);
    assert_eq!(card.primary_action, PrimaryAction::Restart);
    assert!(card.can_review);

    let category = card.category.clone();
    let review = app.launcher().launch(&category, ViewMode::Review).await.unwrap();
    let session = app.quiz_loop().start(review).await.unwrap();
    assert_eq!(session.len(), 3);

    let launch = app.launcher().launch(&category, ViewMode::Quiz).await.unwrap();
    assert_eq!(launch.start_index, 0);
    assert!(storage.answers.load_answers().await.unwrap().is_empty());
    let card = app.catalog().home().await.unwrap().find("A001").cloned().unwrap();
    assert!(!card.is_completed);
    assert_eq!(card.display_progress, 0);
}

#[tokio::test]
async fn interrupted_quiz_resumes_without_clearing() {
    let storage = Storage::in_memory();
    let app = services(&storage, &[("A001", 10)]);
    let quiz = app.quiz_loop();

    let category = app.catalog().find_category("A001").await.unwrap();
    let mut session = quiz
        .start(app.launcher().launch(&category, ViewMode::Quiz).await.unwrap())
        .await
        .unwrap();
    for _ in 0..4 {
        quiz.choose(&mut session, OptionKey::A).await.unwrap();
        quiz.next(&mut session).await.unwrap();
    }
    drop(session);

    let card = app.catalog().home().await.unwrap().find("A001").cloned().unwrap();
    assert_eq!(card.progress, 4);
    assert_eq!(card.primary_action, PrimaryAction::Continue);

    let launch = app.launcher().launch(&category, ViewMode::Quiz).await.unwrap();
    assert_eq!(launch.start_index, 4);
    assert_eq!(storage.answers.load_answers().await.unwrap().len(), 4);
    let session = quiz.start(launch).await.unwrap();
    assert_eq!(session.index(), 4);
    assert_eq!(session.progress().answered, 4);
}

#[tokio::test]
async fn fixed_wrong_answers_leave_the_next_wrong_session_only() {
    let storage = Storage::in_memory();
    let app = services(&storage, &[("A001", 3)]);
    play_through(&app, "A001", &[OptionKey::B, OptionKey::B, OptionKey::A]).await;

    let wrong = app.catalog().find_category("wrong").await.unwrap();
    assert_eq!(wrong.total, 2);

    let quiz = app.quiz_loop();
    let launch = app.launcher().launch(&wrong, ViewMode::Quiz).await.unwrap();
    assert_eq!(launch.mode, ViewMode::Wrong);
    let mut session = quiz.start(launch).await.unwrap();
    assert_eq!(session.len(), 2);

    let ChoiceOutcome::Submitted(record) = quiz.choose(&mut session, OptionKey::A).await.unwrap()
    else {
        panic!("single choice submits");
    };
    assert!(record.is_correct());
    assert_eq!(record.wrong_count(), 1);
    assert_eq!(session.len(), 2);
    assert_eq!(app.catalog().find_category("wrong").await.unwrap().total, 1);

    let relaunch = app.launcher().launch(&wrong, ViewMode::Quiz).await.unwrap();
    let session = quiz.start(relaunch).await.unwrap();
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn favorites_follow_toggles_between_launches() {
    let storage = Storage::in_memory();
    let app = services(&storage, &[("A001", 2)]);
    let quiz = app.quiz_loop();

    let favorites = app.catalog().find_category("favorite").await.unwrap();
    assert!(matches!(
        quiz.start(app.launcher().launch(&favorites, ViewMode::Quiz).await.unwrap())
            .await,
        Err(QuizError::Empty)
    ));

    let category = app.catalog().find_category("A001").await.unwrap();
    let mut session = quiz
        .start(app.launcher().launch(&category, ViewMode::Quiz).await.unwrap())
        .await
        .unwrap();
    assert!(quiz.toggle_favorite(&mut session).await.unwrap());

    let card = app.catalog().home().await.unwrap().find("favorite").cloned().unwrap();
    assert_eq!(card.category.total, 1);
    assert!(!card.is_disabled);

    let mut fav_session = quiz
        .start(app.launcher().launch(&card.category, ViewMode::Quiz).await.unwrap())
        .await
        .unwrap();
    assert_eq!(fav_session.len(), 1);
    assert!(!quiz.toggle_favorite(&mut fav_session).await.unwrap());
    assert_eq!(fav_session.len(), 1);
}

#[tokio::test]
async fn mock_exam_draws_distinct_questions() {
    let storage = Storage::in_memory();
    let app = services(&storage, &[("A001", 40), ("A002", 30)]);
    let mock = app.catalog().find_category("mock").await.unwrap();
    assert_eq!(mock.total, MOCK_EXAM_SIZE);

    let launch = app.launcher().launch(&mock, ViewMode::Quiz).await.unwrap();
    assert_eq!(launch.mode, ViewMode::Mock);
    assert_eq!(launch.questions.len(), MOCK_EXAM_SIZE);
    let ids: HashSet<_> = launch.questions.iter().map(|q| q.id().clone()).collect();
    assert_eq!(ids.len(), MOCK_EXAM_SIZE);

    let small = services(&Storage::in_memory(), &[("A001", 12)]);
    let mock = small.catalog().find_category("mock").await.unwrap();
    assert_eq!(small.launcher().launch(&mock, ViewMode::Mock).await.unwrap().questions.len(), 12);
}

#[tokio::test]
async fn sqlite_backed_services_persist_across_instances() {
    let db_url = "sqlite:file:memdb_quiz_flow?mode=memory&cache=shared";
    let storage = Storage::sqlite(db_url).await.unwrap();
    let app = services(&storage, &[("A001", 2)]);
    play_through(&app, "A001", &[OptionKey::A, OptionKey::A]).await;

    let reopened = AppServices::new_sqlite(db_url, Arc::new(content(&[("A001", 2)])), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let card = reopened.catalog().home().await.unwrap().find("A001").cloned().unwrap();
    assert!(card.is_completed);
    assert_eq!(card.display_progress, 2);
}

#[tokio::test]
async fn blank_ids_never_break_stored_answers() {
    let manifest = r#"{"questionFiles": [
        {"id": "A001", "displayName": "Law A001", "fileName": "A001.json", "isQuestionFile": true}
    ]}"#;
    let file = r#"[
        {"Id": "", "Q": "blank", "A": "yes", "B": "no", "Ans": "A"},
        {"Id": 1, "Q": "q1", "A": "yes", "B": "no", "Ans": "A"},
        {"Id": 2, "Q": "q2", "A": "yes", "B": "no", "Ans": "B"}
    ]"#;
    let content = Arc::new(InMemoryContent::new(manifest).with_file("A001.json", file));
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_blank_ids?mode=memory&cache=shared",
        content,
        Clock::fixed(fixed_now()),
    )
    .await
    .unwrap();

    let category = app.catalog().find_category("A001").await.unwrap();
    assert_eq!(category.total, 2);
    let launch = app.launcher().launch(&category, ViewMode::Quiz).await.unwrap();
    assert_eq!(launch.questions.len(), 2);
    assert_eq!(launch.questions[0].id().as_str(), "A001_1");

    let quiz = app.quiz_loop();
    let mut session = quiz.start(launch).await.unwrap();
    quiz.choose(&mut session, OptionKey::B).await.unwrap();

    let home = app.catalog().home().await.unwrap();
    assert_eq!(home.find("A001").unwrap().progress, 1);
    assert_eq!(home.find("wrong").unwrap().category.total, 1);
}
