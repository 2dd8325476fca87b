//! Quiz results with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Response, UserData};
use crate::scoring::{FitBreakdown, GroupScore, Scorecard};

/// A respondent's scored submission.
///
/// Immutable once created, apart from the premium flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Unique result identifier.
    pub id: Uuid,
    /// The quiz that was taken.
    pub quiz_id: String,
    /// Every recorded response, in answer order.
    pub responses: Vec<Response>,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub group_scores: Vec<GroupScore>,
    /// Matched profile label, or the configured unknown-profile label.
    pub profile: String,
    #[serde(default)]
    pub profile_description: Option<String>,
    #[serde(default)]
    pub fit: Option<FitBreakdown>,
    /// When the respondent finished.
    pub completed_at: DateTime<Utc>,
    /// Whether the detailed result has been unlocked.
    #[serde(default)]
    pub premium: bool,
    pub user_data: UserData,
}

impl QuizResult {
    pub fn new(
        quiz_id: &str,
        responses: Vec<Response>,
        scorecard: Scorecard,
        user_data: UserData,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.to_string(),
            responses,
            score: scorecard.score,
            max_score: scorecard.max_score,
            group_scores: scorecard.group_scores,
            profile: scorecard.profile,
            profile_description: scorecard.profile_description,
            fit: scorecard.fit,
            completed_at,
            premium: false,
            user_data,
        }
    }

    /// Unlock the premium view. Returns `false` if it was already unlocked.
    pub fn unlock_premium(&mut self) -> bool {
        let changed = !self.premium;
        self.premium = true;
        changed
    }

    /// Overall percentage of the reachable score, if any was reachable.
    pub fn percentage(&self) -> Option<f64> {
        crate::scoring::percentage(self.score, self.max_score)
    }

    /// Save the result as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read result from {}", path.display()))?;
        let result: QuizResult =
            serde_json::from_str(&content).context("failed to parse result JSON")?;
        Ok(result)
    }
}

/// Load a response list from a JSON file (an array of `{question_id, answer}`).
pub fn load_responses(path: &Path) -> Result<Vec<Response>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse responses JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> QuizResult {
        QuizResult::new(
            "quiz-1",
            vec![
                Response::single("q1", "opt1"),
                Response::multiple("q2", ["opt3", "opt4"]),
            ],
            Scorecard {
                score: 15.0,
                max_score: 20.0,
                group_scores: vec![],
                profile: "Intermediate".into(),
                profile_description: Some("Getting there".into()),
                fit: None,
            },
            UserData {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn unlock_premium_flips_once() {
        let mut result = make_result();
        assert!(!result.premium);
        assert!(result.unlock_premium());
        assert!(result.premium);
        assert!(!result.unlock_premium());
    }

    #[test]
    fn percentage_of_max() {
        let result = make_result();
        assert_eq!(result.percentage(), Some(75.0));
    }

    #[test]
    fn json_roundtrip() {
        let result = make_result();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("result.json");

        result.save_json(&path).unwrap();
        let loaded = QuizResult::load_json(&path).unwrap();

        assert_eq!(loaded, result);
    }

    #[test]
    fn load_responses_reads_mixed_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.json");
        std::fs::write(
            &path,
            r#"[
                {"question_id": "q1", "answer": "opt1"},
                {"question_id": "q2", "answer": ["opt3", "opt4"]}
            ]"#,
        )
        .unwrap();

        let responses = load_responses(&path).unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1], Response::multiple("q2", ["opt3", "opt4"]));
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(QuizResult::load_json(Path::new("/no/such/result.json")).is_err());
    }
}
