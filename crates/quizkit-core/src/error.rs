//! Quiz error types.
//!
//! The condition evaluator and the scoring strategies never fail; they fall
//! back to well-defined values instead. These errors come from the edges:
//! recording an answer the quiz cannot accept, finishing with required
//! questions open, or building a strategy from an unusable definition.

use thiserror::Error;

use crate::model::QuestionType;

/// Errors raised while driving or configuring a quiz.
#[derive(Debug, Error, PartialEq)]
pub enum QuizError {
    /// The answer references a question the quiz does not define.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// The question's conditions are not met by the current answers.
    #[error("question {0} is not active for the current answers")]
    InactiveQuestion(String),

    /// The answer's shape does not fit the question type.
    #[error("answer for {question_id} does not fit a {kind} question")]
    AnswerShape {
        question_id: String,
        kind: QuestionType,
    },

    /// The answer selects an option the question does not offer.
    #[error("question {question_id} has no option {option_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    /// Finishing was attempted with required questions unanswered.
    #[error("required questions unanswered: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// The scoring method cannot be built from the quiz definition.
    #[error("invalid scoring configuration: {0}")]
    InvalidScoring(String),
}

impl QuizError {
    /// Returns `true` if the respondent can fix this by answering differently.
    pub fn is_respondent_error(&self) -> bool {
        matches!(
            self,
            QuizError::AnswerShape { .. }
                | QuizError::UnknownOption { .. }
                | QuizError::MissingRequired(_)
        )
    }
}
