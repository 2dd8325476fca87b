//! Core data model types for quizkit.
//!
//! These are the types the condition evaluator, the scoring strategies and
//! the session driver all consume: quiz definitions, questions with weighted
//! options and branching conditions, groups, profile ranges, and answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::ScoringMethod;

/// A complete quiz definition as authored by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown before the quiz starts.
    #[serde(default)]
    pub description: String,
    /// Questions in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Weighted question groups (dimensions).
    #[serde(default)]
    pub groups: Vec<QuestionGroup>,
    /// Score buckets mapped to profile labels, matched first to last.
    #[serde(default)]
    pub profiles: Vec<ProfileRange>,
    /// Which scoring strategy reduces responses for this quiz.
    #[serde(default)]
    pub scoring: ScoringMethod,
    /// When the quiz was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the quiz was last edited.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Position of a question in quiz order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    /// Look up a group by id.
    pub fn group(&self, id: &str) -> Option<&QuestionGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Groups sorted by their display order. Ties keep declaration order.
    pub fn groups_in_order(&self) -> Vec<&QuestionGroup> {
        let mut groups: Vec<&QuestionGroup> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.order);
        groups
    }
}

/// A single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the quiz.
    pub id: String,
    /// Question text shown to the respondent.
    pub text: String,
    /// How the question is answered.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Selectable options. Ignored for open-ended questions.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Whether the respondent must answer before finishing.
    #[serde(default)]
    pub required: bool,
    /// Prerequisites deciding whether the question is shown.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Optional image reference displayed with the question.
    #[serde(default)]
    pub image: Option<String>,
    /// Group this question belongs to. `None` means ungrouped.
    #[serde(default)]
    pub group_id: Option<String>,
}

impl Question {
    /// Look up one of this question's options by id.
    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// Exactly one option is selected.
    MultipleChoice,
    /// Any number of options are selected.
    Checkbox,
    /// Free text, never scored.
    OpenEnded,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::Checkbox => write!(f, "checkbox"),
            QuestionType::OpenEnded => write!(f, "open-ended"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" | "single" => Ok(QuestionType::MultipleChoice),
            "checkbox" | "multiple" => Ok(QuestionType::Checkbox),
            "open-ended" | "open_ended" | "text" => Ok(QuestionType::OpenEnded),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A selectable option carrying a point weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Identifier referenced by answers and conditions.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Points contributed when selected. May be zero or negative.
    #[serde(default)]
    pub weight: f64,
}

/// A prerequisite on an earlier question's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// The question whose answer is inspected.
    pub question_id: String,
    /// How the answer is compared.
    pub operator: ConditionOperator,
    /// Comparison value.
    pub value: String,
    /// Relation to the condition immediately before this one.
    #[serde(default)]
    pub logical_operator: Option<LogicalOperator>,
}

/// Comparison applied by a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

impl ConditionOperator {
    /// Whether the operator coerces both sides to numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan | ConditionOperator::LessThan
        )
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOperator::Equals => write!(f, "equals"),
            ConditionOperator::NotEquals => write!(f, "not-equals"),
            ConditionOperator::GreaterThan => write!(f, "greater-than"),
            ConditionOperator::LessThan => write!(f, "less-than"),
            ConditionOperator::Contains => write!(f, "contains"),
        }
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "equals" => Ok(ConditionOperator::Equals),
            "not-equals" => Ok(ConditionOperator::NotEquals),
            "greater-than" => Ok(ConditionOperator::GreaterThan),
            "less-than" => Ok(ConditionOperator::LessThan),
            "contains" => Ok(ConditionOperator::Contains),
            other => Err(format!("unknown condition operator: {other}")),
        }
    }
}

/// How a condition combines with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for LogicalOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AND" => Ok(LogicalOperator::And),
            "OR" => Ok(LogicalOperator::Or),
            other => Err(format!("unknown logical operator: {other}")),
        }
    }
}

/// A named, weighted bucket of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGroup {
    /// Identifier referenced by `Question::group_id`.
    pub id: String,
    /// Display title.
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Multiplier applied to every member question's contribution.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Display order.
    #[serde(default)]
    pub order: i32,
}

fn default_weight() -> f64 {
    1.0
}

/// An inclusive score bucket mapped to a profile label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRange {
    pub min: i64,
    pub max: i64,
    /// Profile label reported to the respondent.
    pub profile: String,
    #[serde(default)]
    pub description: String,
}

impl ProfileRange {
    /// Whether `score` lies within `[min, max]`.
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min as f64 && score <= self.max as f64
    }

    /// Whether two ranges share at least one integer score.
    pub fn overlaps(&self, other: &ProfileRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// A respondent's answer value.
///
/// Serialized untagged: a JSON string for single answers, an array for
/// checkbox selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected option id, or free text for open-ended questions.
    Single(String),
    /// Selected option ids for checkbox questions.
    Multiple(Vec<String>),
}

impl Answer {
    /// All selected values. A single answer yields one element.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Answer::Single(value) => vec![value.as_str()],
            Answer::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the answer carries no selection or empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Single(value) => value.trim().is_empty(),
            Answer::Multiple(values) => values.is_empty(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(value) => write!(f, "{value}"),
            Answer::Multiple(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: String,
    pub answer: Answer,
}

impl Response {
    pub fn new(question_id: impl Into<String>, answer: Answer) -> Self {
        Self {
            question_id: question_id.into(),
            answer,
        }
    }

    /// Shorthand for a single-valued response.
    pub fn single(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(question_id, Answer::Single(value.into()))
    }

    /// Shorthand for a multi-valued (checkbox) response.
    pub fn multiple<I, S>(question_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            question_id,
            Answer::Multiple(values.into_iter().map(Into::into).collect()),
        )
    }
}

/// Find the response recorded for a question. A later response to the same
/// question replaces an earlier one.
pub fn find_response<'a>(responses: &'a [Response], question_id: &str) -> Option<&'a Response> {
    responses.iter().rev().find(|r| r.question_id == question_id)
}

/// Contact details captured when a respondent finishes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}
