//! Scoring strategies.
//!
//! A strategy reduces a quiz's response set to a [`Scorecard`]: a total
//! score, per-group sub-scores and a profile label. Which strategy applies is
//! chosen per quiz through [`ScoringMethod`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::QuizkitConfig;
use crate::error::QuizError;
use crate::model::{Answer, ProfileRange, Question, QuestionType, Quiz, Response, UserData};
use crate::result::QuizResult;

pub mod scarf;
pub mod weighted;

pub use scarf::{Dimension, DimensionScore, FitBreakdown, ScarfScoring, ScarfTemplate};
pub use weighted::WeightedScoring;

/// A policy that reduces responses to a scorecard.
pub trait ScoringStrategy: Send + Sync {
    /// Short strategy name (e.g. "weighted").
    fn name(&self) -> &str;

    /// Score a response set. Never fails; inconsistencies fall back to zero
    /// contributions or the unknown-profile label.
    fn score(&self, quiz: &Quiz, responses: &[Response]) -> Scorecard;
}

/// Outcome of a scoring strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Total score.
    pub score: f64,
    /// Highest score reachable with the same questions answered.
    pub max_score: f64,
    /// Per-group sub-scores, omitted for groups with nothing to score.
    #[serde(default)]
    pub group_scores: Vec<GroupScore>,
    /// Matched profile label.
    pub profile: String,
    /// Description of the matched profile range.
    #[serde(default)]
    pub profile_description: Option<String>,
    /// Dimension-fit breakdown, for strategies that compute one.
    #[serde(default)]
    pub fit: Option<FitBreakdown>,
}

/// A group's share of the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group_id: String,
    pub title: String,
    pub score: f64,
    pub max_score: f64,
    /// `100 * score / max_score`.
    pub percentage: f64,
}

/// Scoring method selected by a quiz definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScoringMethod {
    /// Weighted sum of selected options, scaled by group weight.
    #[default]
    Weighted,
    /// Organization/user dimension fit over three question blocks.
    Scarf(ScarfTemplate),
}

impl ScoringMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ScoringMethod::Weighted => "weighted",
            ScoringMethod::Scarf(_) => "scarf",
        }
    }
}

/// Create a strategy instance from a quiz's scoring method.
pub fn create_strategy(
    method: &ScoringMethod,
    config: &QuizkitConfig,
) -> Result<Box<dyn ScoringStrategy>, QuizError> {
    match method {
        ScoringMethod::Weighted => Ok(Box::new(WeightedScoring::new(&config.unknown_profile))),
        ScoringMethod::Scarf(template) => {
            template.check()?;
            Ok(Box::new(ScarfScoring::new(template.clone())))
        }
    }
}

/// Score a response set with the quiz's own strategy and wrap it in a result.
pub fn score_quiz(
    quiz: &Quiz,
    responses: &[Response],
    user_data: UserData,
    config: &QuizkitConfig,
) -> Result<QuizResult, QuizError> {
    let strategy = create_strategy(&quiz.scoring, config)?;
    let scorecard = strategy.score(quiz, responses);
    tracing::info!(
        quiz = %quiz.id,
        strategy = strategy.name(),
        score = scorecard.score,
        profile = %scorecard.profile,
        "scored quiz"
    );
    let mut result = QuizResult::new(&quiz.id, responses.to_vec(), scorecard, user_data, Utc::now());
    result.premium = config.premium_by_default;
    Ok(result)
}

/// Highest contribution a question can make before group weighting.
///
/// Multiple-choice: the largest option weight. Checkbox: the sum of positive
/// option weights. Open-ended questions are not scored and return `None`.
pub fn max_contribution(question: &Question) -> Option<f64> {
    match question.kind {
        QuestionType::OpenEnded => None,
        QuestionType::MultipleChoice => Some(
            question
                .options
                .iter()
                .map(|o| o.weight)
                .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
                .unwrap_or(0.0),
        ),
        QuestionType::Checkbox => Some(
            question
                .options
                .iter()
                .map(|o| o.weight)
                .filter(|w| *w > 0.0)
                .sum(),
        ),
    }
}

/// Points an answer earns on a question before group weighting.
///
/// Option ids that no longer exist contribute nothing. Open-ended questions
/// return `None`.
pub fn answer_contribution(question: &Question, answer: &Answer) -> Option<f64> {
    match question.kind {
        QuestionType::OpenEnded => None,
        QuestionType::MultipleChoice => {
            let Answer::Single(option_id) = answer else {
                tracing::warn!(
                    question = %question.id,
                    "multiple-choice question answered with a list, scoring 0"
                );
                return Some(0.0);
            };
            match question.option(option_id) {
                Some(option) => Some(option.weight),
                None => {
                    tracing::warn!(
                        question = %question.id,
                        option = %option_id,
                        "answer references a missing option, scoring 0"
                    );
                    Some(0.0)
                }
            }
        }
        QuestionType::Checkbox => {
            let selected = answer.values();
            for id in &selected {
                if question.option(id).is_none() {
                    tracing::warn!(
                        question = %question.id,
                        option = %id,
                        "answer references a missing option, ignoring it"
                    );
                }
            }
            Some(
                question
                    .options
                    .iter()
                    .filter(|o| selected.contains(&o.id.as_str()))
                    .map(|o| o.weight)
                    .sum(),
            )
        }
    }
}

/// First profile range whose inclusive bounds contain `score`.
pub fn resolve_profile(profiles: &[ProfileRange], score: f64) -> Option<&ProfileRange> {
    profiles.iter().find(|range| range.contains(score))
}

/// `100 * score / max_score`, or `None` when there is nothing to score.
pub fn percentage(score: f64, max_score: f64) -> Option<f64> {
    (max_score > 0.0).then(|| 100.0 * score / max_score)
}
