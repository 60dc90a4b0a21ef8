use quiz_core::model::{CategoryCard, PrimaryAction, QuizOutcome};
use services::{HomeView, Phase, QuizSession};

pub fn home(view: &HomeView) {
    println!("{}", view.header_title);
    println!();
    for group in &view.groups {
        println!("{}", group.name);
        for card in &group.cards {
            category(card, "  ");
        }
    }
    for card in &view.categories {
        category(card, "");
    }
}

fn category(card: &CategoryCard, indent: &str) {
    let action = if card.is_disabled {
        "disabled"
    } else {
        match card.primary_action {
            PrimaryAction::Start => "start",
            PrimaryAction::Continue => "continue",
            PrimaryAction::Restart => "restart",
        }
    };
    let mut line = format!(
        "{indent}[{}] {}  {}/{} ({:.0}%)  {action}",
        card.category.id,
        card.category.title,
        card.display_progress,
        card.category.total,
        card.progress_percent,
    );
    if card.can_review {
        line.push_str(", review");
    }
    println!("{line}");
    if let Some(description) = card.category.kind.description() {
        println!("{indent}    {description}");
    }
}

pub fn question(session: &QuizSession) {
    let q = session.current_question();
    let record = session.current_record();
    let favorite = if record.is_some_and(|r| r.is_favorite()) {
        " *"
    } else {
        ""
    };
    println!();
    println!(
        "{} [{}] {}/{}{favorite}",
        session.title(),
        session.mode(),
        session.index() + 1,
        session.len()
    );
    println!("{}", q.content());

    let selection = session.selection();
    for (key, text) in q.options() {
        let mark = if selection.contains(key) { ">" } else { " " };
        println!("{mark} {key}. {text}");
    }

    if session.phase() == Phase::Submitted {
        println!("answer: {}", q.answer());
        if let Some(record) = record.filter(|r| r.is_answered()) {
            let verdict = if record.is_correct() { "correct" } else { "wrong" };
            println!(
                "yours: {} ({verdict})",
                record.selected_answer().unwrap_or_default()
            );
        }
        if !q.explanation().is_empty() {
            println!("{}", q.explanation());
        }
    }
}

pub fn outcome(outcome: &QuizOutcome) {
    match outcome {
        QuizOutcome::ReviewAcknowledged => println!("review finished"),
        QuizOutcome::Scored(summary) => println!(
            "{} finished: {}/{} correct ({}%)",
            summary.title, summary.score.correct, summary.score.total, summary.score.percent
        ),
    }
}
