//! quizkit-core: condition evaluation, scoring, and the quiz data model.
//!
//! This crate defines the quiz data model, the branching condition
//! evaluator, the scoring strategies, and the session driver that the rest
//! of quizkit builds on. Everything here is pure and synchronous apart from
//! the file loaders.

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod result;
pub mod scoring;
pub mod session;

pub use error::QuizError;
