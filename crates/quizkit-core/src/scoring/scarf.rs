//! SCARF dimension-fit scoring.
//!
//! Three blocks of questions are scored per SCARF dimension (Status,
//! Certainty, Autonomy, Relatedness, Fairness). Two blocks describe the
//! organization and are combined with weights 2 and 1; the third describes
//! the respondent. The fit score is how close the two normalised vectors are,
//! and the respondent's two strongest dimensions name a leadership profile.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{find_response, Question, Quiz, Response};

use super::{answer_contribution, max_contribution, GroupScore, Scorecard, ScoringStrategy};

/// A SCARF dimension. Declaration order is tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Status,
    Certainty,
    Autonomy,
    Relatedness,
    Fairness,
}

impl Dimension {
    /// All dimensions, highest priority first.
    pub const ALL: [Dimension; 5] = [
        Dimension::Status,
        Dimension::Certainty,
        Dimension::Autonomy,
        Dimension::Relatedness,
        Dimension::Fairness,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Status => write!(f, "Status"),
            Dimension::Certainty => write!(f, "Certainty"),
            Dimension::Autonomy => write!(f, "Autonomy"),
            Dimension::Relatedness => write!(f, "Relatedness"),
            Dimension::Fairness => write!(f, "Fairness"),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(Dimension::Status),
            "certainty" => Ok(Dimension::Certainty),
            "autonomy" => Ok(Dimension::Autonomy),
            "relatedness" => Ok(Dimension::Relatedness),
            "fairness" => Ok(Dimension::Fairness),
            other => Err(format!("unknown SCARF dimension: {other}")),
        }
    }
}

/// Which questions feed which vector, and how groups map to dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScarfTemplate {
    /// Group id to dimension. Groups not listed fall back to parsing their
    /// title as a dimension name.
    #[serde(default)]
    pub dimensions: BTreeMap<String, Dimension>,
    /// First organization block (question ids).
    #[serde(default)]
    pub organization_primary: Vec<String>,
    /// Second organization block (question ids).
    #[serde(default)]
    pub organization_secondary: Vec<String>,
    /// Respondent block (question ids).
    #[serde(default)]
    pub user: Vec<String>,
    #[serde(default = "default_primary_weight")]
    pub primary_weight: f64,
    #[serde(default = "default_secondary_weight")]
    pub secondary_weight: f64,
}

fn default_primary_weight() -> f64 {
    2.0
}

fn default_secondary_weight() -> f64 {
    1.0
}

impl Default for ScarfTemplate {
    fn default() -> Self {
        Self {
            dimensions: BTreeMap::new(),
            organization_primary: Vec::new(),
            organization_secondary: Vec::new(),
            user: Vec::new(),
            primary_weight: default_primary_weight(),
            secondary_weight: default_secondary_weight(),
        }
    }
}

impl ScarfTemplate {
    /// Reject block weights that cannot produce a meaningful vector.
    pub fn check(&self) -> Result<(), QuizError> {
        for (name, weight) in [
            ("primary_weight", self.primary_weight),
            ("secondary_weight", self.secondary_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(QuizError::InvalidScoring(format!(
                    "{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    /// The dimension a question is scored under, if any.
    pub fn dimension_of(&self, quiz: &Quiz, question: &Question) -> Option<Dimension> {
        let group_id = question.group_id.as_deref()?;
        if let Some(dimension) = self.dimensions.get(group_id) {
            return Some(*dimension);
        }
        quiz.group(group_id)
            .and_then(|group| group.title.parse().ok())
            .or_else(|| group_id.parse().ok())
    }
}

/// One dimension of a scored vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub raw: f64,
    pub max: f64,
    /// `raw / max` clamped to `[0, 1]`, or 0 when `max` is 0.
    pub normalized: f64,
}

/// Full working of a SCARF fit computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitBreakdown {
    pub organization: Vec<DimensionScore>,
    pub user: Vec<DimensionScore>,
    /// Sum of absolute per-dimension differences of the normalised vectors.
    pub total_difference: f64,
    /// Largest total difference possible for the scored dimensions.
    pub max_difference: f64,
    pub fit_score: f64,
    /// The respondent's two strongest dimensions, in priority order.
    pub dominant: [Dimension; 2],
    pub leadership_profile: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct Vector {
    raw: [f64; 5],
    max: [f64; 5],
}

impl Vector {
    fn scaled_add(&mut self, other: &Vector, factor: f64) {
        for i in 0..5 {
            self.raw[i] += other.raw[i] * factor;
            self.max[i] += other.max[i] * factor;
        }
    }

    fn normalized(&self, i: usize) -> f64 {
        if self.max[i] > 0.0 {
            (self.raw[i] / self.max[i]).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn scores(&self) -> Vec<DimensionScore> {
        Dimension::ALL
            .iter()
            .map(|d| DimensionScore {
                dimension: *d,
                raw: self.raw[d.index()],
                max: self.max[d.index()],
                normalized: self.normalized(d.index()),
            })
            .collect()
    }
}

/// Leadership labels for pairs of dominant dimensions, keyed in priority
/// order.
const LEADERSHIP_PROFILES: &[((Dimension, Dimension), &str)] = &[
    ((Dimension::Status, Dimension::Certainty), "Leader Strategico"),
    ((Dimension::Status, Dimension::Autonomy), "Leader Visionario"),
    ((Dimension::Status, Dimension::Relatedness), "Leader Carismatico"),
    ((Dimension::Certainty, Dimension::Autonomy), "Leader Indipendente"),
    ((Dimension::Certainty, Dimension::Fairness), "Leader Metodico"),
    ((Dimension::Relatedness, Dimension::Fairness), "Leader Empatico"),
];

/// Pick the two strongest dimensions, ties broken by priority, and return
/// them in priority order.
pub fn dominant_pair(values: &[(Dimension, f64)]) -> [Dimension; 2] {
    let mut ranked: Vec<(Dimension, f64)> = values.to_vec();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let first = ranked.first().map_or(Dimension::Status, |(d, _)| *d);
    let second = ranked.get(1).map_or(Dimension::Certainty, |(d, _)| *d);
    if first <= second {
        [first, second]
    } else {
        [second, first]
    }
}

/// Name a leadership profile from a dominant pair.
pub fn leadership_profile(pair: [Dimension; 2]) -> String {
    LEADERSHIP_PROFILES
        .iter()
        .find(|((a, b), _)| [*a, *b] == pair)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("{}/{} Dominante", pair[0], pair[1]))
}

/// Fit score from the two vectors' normalised differences.
fn fit_score(total_difference: f64, max_difference: f64) -> f64 {
    if max_difference <= 0.0 {
        return 0.0;
    }
    (100.0 - total_difference / max_difference * 100.0).clamp(0.0, 100.0)
}

/// The SCARF strategy.
pub struct ScarfScoring {
    template: ScarfTemplate,
}

impl ScarfScoring {
    pub fn new(template: ScarfTemplate) -> Self {
        Self { template }
    }

    fn block_vector(&self, quiz: &Quiz, responses: &[Response], block: &[String]) -> Vector {
        let mut vector = Vector::default();
        for question_id in block {
            let Some(question) = quiz.question(question_id) else {
                tracing::warn!(question = %question_id, "SCARF block names an unknown question");
                continue;
            };
            let Some(dimension) = self.template.dimension_of(quiz, question) else {
                tracing::debug!(question = %question_id, "question has no SCARF dimension, skipping");
                continue;
            };
            let Some(max) = max_contribution(question) else {
                continue;
            };
            let actual = find_response(responses, question_id)
                .and_then(|r| answer_contribution(question, &r.answer))
                .unwrap_or(0.0);
            vector.raw[dimension.index()] += actual;
            vector.max[dimension.index()] += max;
        }
        vector
    }

    /// Compute the full fit breakdown for a response set.
    pub fn breakdown(&self, quiz: &Quiz, responses: &[Response]) -> FitBreakdown {
        let primary = self.block_vector(quiz, responses, &self.template.organization_primary);
        let secondary = self.block_vector(quiz, responses, &self.template.organization_secondary);
        let user = self.block_vector(quiz, responses, &self.template.user);

        let mut organization = Vector::default();
        organization.scaled_add(&primary, self.template.primary_weight);
        organization.scaled_add(&secondary, self.template.secondary_weight);

        let mut total_difference = 0.0;
        let mut max_difference = 0.0;
        for i in 0..5 {
            if organization.max[i] > 0.0 || user.max[i] > 0.0 {
                total_difference += (organization.normalized(i) - user.normalized(i)).abs();
                max_difference += 1.0;
            }
        }

        let user_values: Vec<(Dimension, f64)> = Dimension::ALL
            .iter()
            .map(|d| (*d, user.raw[d.index()]))
            .collect();
        let dominant = dominant_pair(&user_values);

        FitBreakdown {
            organization: organization.scores(),
            user: user.scores(),
            total_difference,
            max_difference,
            fit_score: fit_score(total_difference, max_difference),
            dominant,
            leadership_profile: leadership_profile(dominant),
        }
    }
}

impl ScoringStrategy for ScarfScoring {
    fn name(&self) -> &str {
        "scarf"
    }

    fn score(&self, quiz: &Quiz, responses: &[Response]) -> Scorecard {
        let fit = self.breakdown(quiz, responses);
        let group_scores = fit
            .user
            .iter()
            .filter(|d| d.max > 0.0)
            .map(|d| GroupScore {
                group_id: d.dimension.to_string().to_lowercase(),
                title: d.dimension.to_string(),
                score: d.raw,
                max_score: d.max,
                percentage: 100.0 * d.raw / d.max,
            })
            .collect();

        tracing::debug!(
            quiz = %quiz.id,
            fit = fit.fit_score,
            profile = %fit.leadership_profile,
            "computed SCARF fit"
        );

        Scorecard {
            score: fit.fit_score,
            max_score: 100.0,
            group_scores,
            profile: fit.leadership_profile.clone(),
            profile_description: None,
            fit: Some(fit),
        }
    }
}
