//! The `quizkit active` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizkit_core::parser::parse_quiz;
use quizkit_core::result::load_responses;
use quizkit_core::session::QuizSession;

pub fn execute(quiz_path: PathBuf, responses_path: Option<PathBuf>) -> Result<()> {
    let quiz = parse_quiz(&quiz_path)?;
    let responses = match responses_path {
        Some(path) => load_responses(&path)?,
        None => Vec::new(),
    };
    let given = responses.len();

    let session = QuizSession::resume(&quiz, responses);
    let dropped = given - session.responses().len();
    if dropped > 0 {
        eprintln!("Ignored {dropped} response(s) to unknown or inactive questions.");
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Type", "Required", "Answer"]);
    for (i, question) in session.active_questions().into_iter().enumerate() {
        let answer = session
            .responses()
            .iter()
            .find(|r| r.question_id == question.id)
            .map(|r| r.answer.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{} ({})", question.text, question.id)),
            Cell::new(question.kind),
            Cell::new(if question.required { "yes" } else { "no" }),
            Cell::new(answer),
        ]);
    }
    println!("{table}");

    let progress = session.progress();
    println!(
        "Progress: {}/{} answered ({:.0}%)",
        progress.answered,
        progress.active,
        progress.fraction() * 100.0
    );

    match session.next_question() {
        Some(next) => println!("Next question: {} ({})", next.id, next.text),
        None => println!("All active questions answered."),
    }

    let missing = session.missing_required();
    if !missing.is_empty() {
        println!("Required and unanswered: {}", missing.join(", "));
    }

    Ok(())
}
