use std::io::{self, BufRead, Write};

use quiz_core::model::{OptionKey, ViewMode};
use services::{AppServices, QuizError, QuizLoopService, QuizSession, StepOutcome};

use crate::render;

enum Flow {
    Show,
    Stay,
    Done,
}

fn print_help() {
    println!("a-e pick option    s submit selection    v reveal answer");
    println!("n next    p previous    <number> jump to question");
    println!("f toggle favourite    r report issue link    g search link    q quit");
}

/// Interactive quiz over stdin until the learner quits or finishes.
pub async fn run(
    app: &AppServices,
    category_id: &str,
    mode: ViewMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = app.catalog().find_category(category_id).await?;
    let launch = app.launcher().launch(&category, mode).await?;
    let quiz = app.quiz_loop();
    let mut session = match quiz.start(launch).await {
        Ok(session) => session,
        Err(QuizError::Empty) => {
            println!("{}: no questions to show", category.title);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    print_help();
    render::question(&session);
    let mut lines = io::stdin().lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match step(&quiz, &mut session, line.trim()).await {
            Ok(Flow::Show) => render::question(&session),
            Ok(Flow::Stay) => {}
            Ok(Flow::Done) => break,
            Err(QuizError::Storage(err)) => return Err(err.into()),
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}

async fn step(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    input: &str,
) -> Result<Flow, QuizError> {
    match input.to_ascii_lowercase().as_str() {
        "q" => Ok(Flow::Done),
        "n" => match quiz.next(session).await? {
            StepOutcome::Moved(_) => Ok(Flow::Show),
            StepOutcome::Finished(outcome) => {
                render::outcome(&outcome);
                Ok(Flow::Done)
            }
        },
        "p" => {
            quiz.prev(session).await?;
            Ok(Flow::Show)
        }
        "s" => {
            quiz.submit(session).await?;
            Ok(Flow::Show)
        }
        "v" => {
            session.reveal()?;
            Ok(Flow::Show)
        }
        "f" => {
            if quiz.toggle_favorite(session).await? {
                println!("added to favourites");
            } else {
                println!("removed from favourites");
            }
            Ok(Flow::Stay)
        }
        "r" => {
            println!("{}", quiz.report_url(session)?);
            Ok(Flow::Stay)
        }
        "g" => {
            println!("{}", quiz.search_url(session)?);
            Ok(Flow::Stay)
        }
        other => {
            if let Some(key) = OptionKey::from_letter(other) {
                quiz.choose(session, key).await?;
                Ok(Flow::Show)
            } else if let Ok(number) = other.parse::<usize>() {
                quiz.go_to(session, number.saturating_sub(1)).await?;
                Ok(Flow::Show)
            } else {
                print_help();
                Ok(Flow::Stay)
            }
        }
    }
}
