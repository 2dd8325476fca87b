//! Respondent session driver.
//!
//! Holds the running answer set for one respondent, works out which question
//! comes next, and produces the final result.

use chrono::Utc;

use crate::condition::{active_questions, is_active_at};
use crate::config::QuizkitConfig;
use crate::error::QuizError;
use crate::model::{Answer, Question, QuestionType, Quiz, Response, UserData};
use crate::result::QuizResult;
use crate::scoring::create_strategy;

/// How far a respondent has got through the active questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub active: usize,
}

impl Progress {
    /// Completion as a fraction in `[0, 1]`. An empty quiz is complete.
    pub fn fraction(&self) -> f64 {
        if self.active == 0 {
            1.0
        } else {
            self.answered as f64 / self.active as f64
        }
    }
}

/// One respondent's pass through a quiz.
pub struct QuizSession<'a> {
    quiz: &'a Quiz,
    responses: Vec<Response>,
}

impl<'a> QuizSession<'a> {
    pub fn new(quiz: &'a Quiz) -> Self {
        Self {
            quiz,
            responses: Vec::new(),
        }
    }

    /// Resume a session from previously recorded responses.
    ///
    /// Responses to unknown or inactive questions are dropped. A question
    /// answered more than once keeps its latest answer, in the position of
    /// its first.
    pub fn resume(quiz: &'a Quiz, responses: Vec<Response>) -> Self {
        let mut kept: Vec<Response> = Vec::with_capacity(responses.len());
        for response in responses {
            if quiz.question(&response.question_id).is_none() {
                continue;
            }
            match kept
                .iter_mut()
                .find(|r| r.question_id == response.question_id)
            {
                Some(existing) => existing.answer = response.answer,
                None => kept.push(response),
            }
        }
        let mut session = Self {
            quiz,
            responses: kept,
        };
        session.prune_inactive();
        session
    }

    pub fn quiz(&self) -> &Quiz {
        self.quiz
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Questions currently eligible to be shown, in quiz order.
    pub fn active_questions(&self) -> Vec<&'a Question> {
        active_questions(self.quiz, &self.responses)
    }

    /// The first active question without a response.
    pub fn next_question(&self) -> Option<&'a Question> {
        self.active_questions()
            .into_iter()
            .find(|q| !self.is_answered(&q.id))
    }

    /// Whether the question has a non-empty answer.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.responses
            .iter()
            .any(|r| r.question_id == question_id && !r.answer.is_empty())
    }

    /// Record an answer, replacing any previous answer to the same question.
    ///
    /// Answers that no longer apply because the change deactivated their
    /// question are removed.
    pub fn answer(&mut self, question_id: &str, answer: Answer) -> Result<(), QuizError> {
        let position = self
            .quiz
            .position(question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))?;
        if !is_active_at(self.quiz, position, &self.responses) {
            return Err(QuizError::InactiveQuestion(question_id.to_string()));
        }
        let question = &self.quiz.questions[position];
        check_answer(question, &answer)?;

        match self
            .responses
            .iter_mut()
            .find(|r| r.question_id == question_id)
        {
            Some(existing) => existing.answer = answer,
            None => self.responses.push(Response::new(question_id, answer)),
        }
        tracing::debug!(question = %question_id, "recorded answer");

        self.prune_inactive();
        Ok(())
    }

    /// Drop responses whose question is no longer active, until stable.
    fn prune_inactive(&mut self) {
        loop {
            let quiz = self.quiz;
            let snapshot = self.responses.clone();
            let before = self.responses.len();
            self.responses.retain(|r| {
                quiz.position(&r.question_id)
                    .is_some_and(|p| is_active_at(quiz, p, &snapshot))
            });
            let removed = before - self.responses.len();
            if removed == 0 {
                break;
            }
            tracing::debug!(removed, "dropped answers to deactivated questions");
        }
    }

    pub fn progress(&self) -> Progress {
        let active = self.active_questions();
        Progress {
            answered: active.iter().filter(|q| self.is_answered(&q.id)).count(),
            active: active.len(),
        }
    }

    /// Ids of required, active questions still unanswered.
    pub fn missing_required(&self) -> Vec<String> {
        self.active_questions()
            .into_iter()
            .filter(|q| q.required && !self.is_answered(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.next_question().is_none()
    }

    /// Score the session. Fails while required questions are unanswered.
    pub fn finish(&self, user_data: UserData, config: &QuizkitConfig) -> Result<QuizResult, QuizError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(QuizError::MissingRequired(missing));
        }
        self.force_finish(user_data, config)
    }

    /// Score the session as it stands, even with questions left open.
    pub fn force_finish(&self, user_data: UserData, config: &QuizkitConfig) -> Result<QuizResult, QuizError> {
        let strategy = create_strategy(&self.quiz.scoring, config)?;
        let scorecard = strategy.score(self.quiz, &self.responses);
        tracing::info!(
            quiz = %self.quiz.id,
            responses = self.responses.len(),
            score = scorecard.score,
            profile = %scorecard.profile,
            "quiz finished"
        );
        let mut result = QuizResult::new(
            &self.quiz.id,
            self.responses.clone(),
            scorecard,
            user_data,
            Utc::now(),
        );
        result.premium = config.premium_by_default;
        Ok(result)
    }
}

/// Check an answer's shape and option ids against its question.
fn check_answer(question: &Question, answer: &Answer) -> Result<(), QuizError> {
    let shape_error = || QuizError::AnswerShape {
        question_id: question.id.clone(),
        kind: question.kind,
    };
    match (question.kind, answer) {
        (QuestionType::OpenEnded, Answer::Single(_)) => Ok(()),
        (QuestionType::OpenEnded, Answer::Multiple(_)) => Err(shape_error()),
        (QuestionType::MultipleChoice, Answer::Multiple(_)) => Err(shape_error()),
        (QuestionType::MultipleChoice, Answer::Single(_)) | (QuestionType::Checkbox, _) => {
            for id in answer.values() {
                if question.option(id).is_none() {
                    return Err(QuizError::UnknownOption {
                        question_id: question.id.clone(),
                        option_id: id.to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}
