//! Branching condition evaluator.
//!
//! A question's conditions are a flat list where each entry carries the
//! logical operator joining it to the entry before it. The list reads as a
//! disjunction of conjunctions: every `OR` starts a new group, all conditions
//! within a group must hold, and any satisfied group activates the question.
//!
//! `ConditionExpr` is the explicit tree form of the same reading, for callers
//! that want to compose deeper expressions.

use serde::{Deserialize, Serialize};

use crate::model::{
    find_response, Answer, Condition, ConditionOperator, LogicalOperator, Question, Quiz, Response,
};

/// Evaluate one condition against the responses collected so far.
///
/// A prerequisite without a response never satisfies the condition,
/// whatever the operator.
pub fn evaluate_condition(condition: &Condition, responses: &[Response]) -> bool {
    let Some(response) = find_response(responses, &condition.question_id) else {
        return false;
    };
    compare(&response.answer, condition.operator, &condition.value)
}

fn compare(answer: &Answer, operator: ConditionOperator, value: &str) -> bool {
    match operator {
        ConditionOperator::Equals => answer_equals(answer, value),
        ConditionOperator::NotEquals => !answer_equals(answer, value),
        ConditionOperator::GreaterThan => {
            matches!(numeric_pair(answer, value), Some((a, v)) if a > v)
        }
        ConditionOperator::LessThan => {
            matches!(numeric_pair(answer, value), Some((a, v)) if a < v)
        }
        ConditionOperator::Contains => match answer {
            Answer::Single(text) => text.contains(value),
            Answer::Multiple(values) => values.iter().any(|v| v == value),
        },
    }
}

fn answer_equals(answer: &Answer, value: &str) -> bool {
    match answer {
        Answer::Single(text) => text == value,
        Answer::Multiple(values) => values.iter().any(|v| v == value),
    }
}

/// Both sides as numbers, or `None` if either fails to parse.
/// Checkbox answers never coerce.
fn numeric_pair(answer: &Answer, value: &str) -> Option<(f64, f64)> {
    let Answer::Single(text) = answer else {
        return None;
    };
    let a = text.trim().parse::<f64>().ok()?;
    let v = value.trim().parse::<f64>().ok()?;
    Some((a, v))
}

/// Split a flat condition list into its AND-groups.
///
/// A group boundary falls immediately before every condition whose logical
/// operator is `OR`. The first condition always opens the first group,
/// whatever its own operator says.
pub fn or_groups(conditions: &[Condition]) -> Vec<&[Condition]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (i, condition) in conditions.iter().enumerate().skip(1) {
        if condition.logical_operator == Some(LogicalOperator::Or) {
            groups.push(&conditions[start..i]);
            start = i;
        }
    }
    if start < conditions.len() {
        groups.push(&conditions[start..]);
    }
    groups
}

/// Decide whether a question with these conditions is active.
///
/// An empty list is always active.
pub fn is_active(conditions: &[Condition], responses: &[Response]) -> bool {
    if conditions.is_empty() {
        return true;
    }
    or_groups(conditions).iter().any(|group| {
        group
            .iter()
            .all(|condition| evaluate_condition(condition, responses))
    })
}

/// Decide whether the question at `position` in quiz order is active.
///
/// Only responses to questions placed before `position` are visible to its
/// conditions, so a condition on a later question (or the question itself)
/// is always false even if an answer for it exists.
pub fn is_active_at(quiz: &Quiz, position: usize, responses: &[Response]) -> bool {
    let Some(question) = quiz.questions.get(position) else {
        return false;
    };
    if question.conditions.is_empty() {
        return true;
    }
    let prior: Vec<Response> = responses
        .iter()
        .filter(|r| quiz.position(&r.question_id).is_some_and(|p| p < position))
        .cloned()
        .collect();
    is_active(&question.conditions, &prior)
}

/// All questions currently active for this response set, in quiz order.
pub fn active_questions<'a>(quiz: &'a Quiz, responses: &[Response]) -> Vec<&'a Question> {
    quiz.questions
        .iter()
        .enumerate()
        .filter(|(position, question)| {
            let active = is_active_at(quiz, *position, responses);
            if !active {
                tracing::debug!(question = %question.id, "question inactive for current answers");
            }
            active
        })
        .map(|(_, question)| question)
        .collect()
}

/// Tree form of a condition expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionExpr {
    /// A single comparison.
    Leaf { condition: Condition },
    /// True when every child is true. Empty is true.
    AllOf { children: Vec<ConditionExpr> },
    /// True when any child is true. Empty is false.
    AnyOf { children: Vec<ConditionExpr> },
}

impl ConditionExpr {
    /// Build the tree equivalent of a flat, operator-annotated list.
    ///
    /// An empty list becomes an empty `AllOf`, which is always true.
    pub fn from_flat(conditions: &[Condition]) -> Self {
        if conditions.is_empty() {
            return ConditionExpr::AllOf { children: vec![] };
        }
        let children = or_groups(conditions)
            .into_iter()
            .map(|group| ConditionExpr::AllOf {
                children: group
                    .iter()
                    .map(|c| ConditionExpr::Leaf {
                        condition: c.clone(),
                    })
                    .collect(),
            })
            .collect();
        ConditionExpr::AnyOf { children }
    }

    pub fn evaluate(&self, responses: &[Response]) -> bool {
        match self {
            ConditionExpr::Leaf { condition } => evaluate_condition(condition, responses),
            ConditionExpr::AllOf { children } => children.iter().all(|c| c.evaluate(responses)),
            ConditionExpr::AnyOf { children } => children.iter().any(|c| c.evaluate(responses)),
        }
    }
}
