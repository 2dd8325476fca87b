//! Tabular export of a scored result.
//!
//! One row per recorded response, followed by a `Total score` row and a
//! `Profile` row. Rows are plain strings and numbers so any writer can
//! consume them.

use serde::Serialize;

use quizkit_core::model::{Answer, Question, QuestionType, Quiz};
use quizkit_core::result::QuizResult;
use quizkit_core::scoring::answer_contribution;

/// Placeholder for answers that cannot be resolved against the quiz.
pub const UNRESOLVED: &str = "-";

/// One line of an exported result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Question text, or the trailer label.
    pub label: String,
    /// Resolved answer text.
    pub answer: String,
    /// Points earned, including group weight. `None` for rows that carry no
    /// score.
    pub score: Option<f64>,
}

/// Build the export rows for a result.
pub fn result_rows(quiz: &Quiz, result: &QuizResult) -> Vec<ResultRow> {
    let mut rows: Vec<ResultRow> = result
        .responses
        .iter()
        .map(|response| match quiz.question(&response.question_id) {
            Some(question) => ResultRow {
                label: question.text.clone(),
                answer: resolve_answer(question, &response.answer),
                score: row_score(quiz, question, &response.answer),
            },
            None => ResultRow {
                label: response.question_id.clone(),
                answer: UNRESOLVED.to_string(),
                score: None,
            },
        })
        .collect();

    rows.push(ResultRow {
        label: "Total score".into(),
        answer: String::new(),
        score: Some(result.score),
    });
    rows.push(ResultRow {
        label: "Profile".into(),
        answer: result.profile.clone(),
        score: None,
    });
    rows
}

/// Human-readable text for an answer.
///
/// Choice answers show the selected option texts; ids that no longer exist
/// are dropped. Open-ended answers are shown verbatim.
pub fn resolve_answer(question: &Question, answer: &Answer) -> String {
    let text = match question.kind {
        QuestionType::OpenEnded => answer.to_string(),
        QuestionType::MultipleChoice | QuestionType::Checkbox => answer
            .values()
            .into_iter()
            .filter_map(|id| question.option(id).map(|o| o.text.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
    };
    if text.trim().is_empty() {
        UNRESOLVED.to_string()
    } else {
        text
    }
}

fn row_score(quiz: &Quiz, question: &Question, answer: &Answer) -> Option<f64> {
    let weight = question
        .group_id
        .as_deref()
        .and_then(|id| quiz.group(id))
        .map_or(1.0, |g| g.weight);
    answer_contribution(question, answer).map(|points| points * weight)
}

/// Format a score without trailing zeros for whole numbers.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.2}")
    }
}

/// Render rows as a markdown table.
pub fn to_markdown(rows: &[ResultRow]) -> String {
    let mut out = String::from("| Question | Answer | Score |\n|---|---|---:|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&row.label),
            escape_cell(&row.answer),
            row.score.map(format_score).unwrap_or_default()
        ));
    }
    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
