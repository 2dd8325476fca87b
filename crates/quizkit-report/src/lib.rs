//! Result export for quizkit.
//!
//! Turns a scored [`quizkit_core::result::QuizResult`] into tabular rows, a
//! markdown table or a self-contained HTML page.

pub mod export;
pub mod html;
