//! Weighted-sum scoring.
//!
//! Each answered question contributes its selected option weights, scaled
//! by its group's weight. Grouped questions also accumulate into that
//! group's sub-score. The total is matched against the quiz's profile ranges
//! first to last.

use std::collections::HashMap;

use crate::model::{Quiz, Response};

use super::{
    answer_contribution, max_contribution, percentage, resolve_profile, GroupScore, Scorecard,
    ScoringStrategy,
};

/// The default scoring strategy.
pub struct WeightedScoring {
    unknown_profile: String,
}

impl WeightedScoring {
    pub fn new(unknown_profile: &str) -> Self {
        Self {
            unknown_profile: unknown_profile.to_string(),
        }
    }
}

#[derive(Default)]
struct GroupTally {
    score: f64,
    max_score: f64,
}

impl ScoringStrategy for WeightedScoring {
    fn name(&self) -> &str {
        "weighted"
    }

    fn score(&self, quiz: &Quiz, responses: &[Response]) -> Scorecard {
        let mut total = 0.0;
        let mut max_total = 0.0;
        let mut tallies: HashMap<&str, GroupTally> = HashMap::new();
        let latest: HashMap<&str, usize> = responses
            .iter()
            .enumerate()
            .map(|(i, r)| (r.question_id.as_str(), i))
            .collect();

        for (i, response) in responses.iter().enumerate() {
            if latest.get(response.question_id.as_str()) != Some(&i) {
                tracing::debug!(question = %response.question_id, "superseded response, skipping");
                continue;
            }
            let Some(question) = quiz.question(&response.question_id) else {
                tracing::warn!(
                    question = %response.question_id,
                    "response to unknown question, skipping"
                );
                continue;
            };
            let (Some(actual), Some(max)) = (
                answer_contribution(question, &response.answer),
                max_contribution(question),
            ) else {
                continue;
            };

            let group = question.group_id.as_deref().and_then(|id| {
                let group = quiz.group(id);
                if group.is_none() {
                    tracing::warn!(question = %question.id, group = %id, "unknown group, scoring ungrouped");
                }
                group
            });

            match group {
                Some(group) => {
                    let weighted = actual * group.weight;
                    let weighted_max = max * group.weight;
                    total += weighted;
                    max_total += weighted_max;
                    let tally = tallies.entry(group.id.as_str()).or_default();
                    tally.score += weighted;
                    tally.max_score += weighted_max;
                    tracing::debug!(question = %question.id, group = %group.id, weighted, "scored response");
                }
                None => {
                    total += actual;
                    max_total += max;
                    tracing::debug!(question = %question.id, actual, "scored response");
                }
            }
        }

        let group_scores = quiz
            .groups_in_order()
            .into_iter()
            .filter_map(|group| {
                let tally = tallies.get(group.id.as_str())?;
                let percentage = percentage(tally.score, tally.max_score)?;
                Some(GroupScore {
                    group_id: group.id.clone(),
                    title: group.title.clone(),
                    score: tally.score,
                    max_score: tally.max_score,
                    percentage,
                })
            })
            .collect();

        let (profile, profile_description) = match resolve_profile(&quiz.profiles, total) {
            Some(range) => (range.profile.clone(), Some(range.description.clone())),
            None => {
                tracing::warn!(quiz = %quiz.id, score = total, "no profile range matches score");
                (self.unknown_profile.clone(), None)
            }
        };

        Scorecard {
            score: total,
            max_score: max_total,
            group_scores,
            profile,
            profile_description,
            fit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, ProfileRange, Question, QuestionGroup, QuestionType};
    use crate::scoring::ScoringMethod;

    fn option(id: &str, weight: f64) -> AnswerOption {
        AnswerOption {
            id: id.into(),
            text: id.to_uppercase(),
            weight,
        }
    }

    fn question(id: &str, kind: QuestionType, options: Vec<AnswerOption>, group: Option<&str>) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            kind,
            options,
            required: true,
            conditions: vec![],
            image: None,
            group_id: group.map(Into::into),
        }
    }

    fn group(id: &str, weight: f64, order: i32) -> QuestionGroup {
        QuestionGroup {
            id: id.into(),
            title: format!("Group {id}"),
            description: None,
            weight,
            order,
        }
    }

    fn profiles() -> Vec<ProfileRange> {
        vec![
            ProfileRange {
                min: 0,
                max: 10,
                profile: "Beginner".into(),
                description: "Just starting".into(),
            },
            ProfileRange {
                min: 11,
                max: 20,
                profile: "Intermediate".into(),
                description: "Getting there".into(),
            },
        ]
    }

    fn quiz(questions: Vec<Question>, groups: Vec<QuestionGroup>) -> Quiz {
        Quiz {
            id: "quiz".into(),
            title: "Quiz".into(),
            description: String::new(),
            questions,
            groups,
            profiles: profiles(),
            scoring: ScoringMethod::Weighted,
            created_at: None,
            updated_at: None,
        }
    }

    fn worked_example() -> Quiz {
        quiz(
            vec![
                question("q1", QuestionType::MultipleChoice, vec![option("opt1", 5.0), option("opt2", 10.0)], None),
                question("q2", QuestionType::Checkbox, vec![option("opt3", 3.0), option("opt4", 7.0)], None),
            ],
            vec![],
        )
    }

    fn strategy() -> WeightedScoring {
        WeightedScoring::new("Unknown profile")
    }

    #[test]
    fn single_multiple_choice_lands_in_beginner() {
        let quiz = worked_example();
        let low = strategy().score(&quiz, &[Response::single("q1", "opt1")]);
        assert_eq!(low.score, 5.0);
        assert_eq!(low.profile, "Beginner");

        let high = strategy().score(&quiz, &[Response::single("q1", "opt2")]);
        assert_eq!(high.score, 10.0);
        assert_eq!(high.profile, "Beginner");
        assert_eq!(high.profile_description.as_deref(), Some("Just starting"));
    }

    #[test]
    fn worked_example_totals_fifteen_intermediate() {
        let quiz = worked_example();
        let card = strategy().score(
            &quiz,
            &[
                Response::single("q1", "opt1"),
                Response::multiple("q2", ["opt3", "opt4"]),
            ],
        );
        assert_eq!(card.score, 15.0);
        assert_eq!(card.max_score, 20.0);
        assert_eq!(card.profile, "Intermediate");
        assert!(card.group_scores.is_empty());
    }

    #[test]
    fn twenty_points_is_intermediate() {
        let quiz = worked_example();
        let card = strategy().score(
            &quiz,
            &[
                Response::single("q1", "opt2"),
                Response::multiple("q2", ["opt3", "opt4"]),
            ],
        );
        assert_eq!(card.score, 20.0);
        assert_eq!(card.profile, "Intermediate");
    }

    #[test]
    fn open_ended_only_scores_zero() {
        let quiz = quiz(
            vec![
                question("t1", QuestionType::OpenEnded, vec![], None),
                question("t2", QuestionType::OpenEnded, vec![], None),
            ],
            vec![],
        );
        let card = strategy().score(
            &quiz,
            &[Response::single("t1", "hello"), Response::single("t2", "world")],
        );
        assert_eq!(card.score, 0.0);
        assert_eq!(card.max_score, 0.0);
        assert_eq!(card.profile, "Beginner");
    }

    #[test]
    fn group_weight_doubles_score_and_max() {
        let quiz = quiz(
            vec![
                question("q1", QuestionType::MultipleChoice, vec![option("a", 3.0), option("b", 4.0)], Some("g")),
                question("q2", QuestionType::MultipleChoice, vec![option("c", 1.0)], None),
            ],
            vec![group("g", 2.0, 0)],
        );
        let card = strategy().score(
            &quiz,
            &[Response::single("q1", "a"), Response::single("q2", "c")],
        );
        assert_eq!(card.score, 7.0);
        assert_eq!(card.max_score, 9.0);
        assert_eq!(card.group_scores.len(), 1);
        let g = &card.group_scores[0];
        assert_eq!(g.group_id, "g");
        assert_eq!(g.score, 6.0);
        assert_eq!(g.max_score, 8.0);
        assert_eq!(g.percentage, 75.0);
    }

    #[test]
    fn groups_with_zero_max_are_omitted() {
        let quiz = quiz(
            vec![
                question("q1", QuestionType::MultipleChoice, vec![option("a", 0.0)], Some("zero")),
                question("q2", QuestionType::OpenEnded, vec![], Some("text")),
                question("q3", QuestionType::MultipleChoice, vec![option("b", 2.0)], Some("real")),
            ],
            vec![group("real", 1.0, 2), group("zero", 1.0, 1), group("text", 1.0, 0)],
        );
        let card = strategy().score(
            &quiz,
            &[
                Response::single("q1", "a"),
                Response::single("q2", "words"),
                Response::single("q3", "b"),
            ],
        );
        let ids: Vec<&str> = card.group_scores.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["real"]);
    }

    #[test]
    fn group_scores_follow_group_order() {
        let quiz = quiz(
            vec![
                question("q1", QuestionType::MultipleChoice, vec![option("a", 1.0)], Some("second")),
                question("q2", QuestionType::MultipleChoice, vec![option("b", 1.0)], Some("first")),
            ],
            vec![group("second", 1.0, 2), group("first", 1.0, 1)],
        );
        let card = strategy().score(
            &quiz,
            &[Response::single("q1", "a"), Response::single("q2", "b")],
        );
        let ids: Vec<&str> = card.group_scores.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn unknown_questions_and_options_do_not_abort() {
        let quiz = worked_example();
        let card = strategy().score(
            &quiz,
            &[
                Response::single("ghost", "x"),
                Response::single("q1", "removed-option"),
                Response::multiple("q2", ["opt4"]),
            ],
        );
        assert_eq!(card.score, 7.0);
        assert_eq!(card.profile, "Beginner");
    }

    #[test]
    fn repeated_answers_score_only_the_latest() {
        let quiz = worked_example();
        let card = strategy().score(
            &quiz,
            &[
                Response::single("q1", "opt1"),
                Response::single("q1", "opt2"),
                Response::multiple("q2", ["opt3", "opt4"]),
            ],
        );
        assert_eq!(card.score, 20.0);
        assert_eq!(card.max_score, 20.0);
        assert_eq!(card.profile, "Intermediate");
    }

    #[test]
    fn unmatched_score_uses_unknown_profile() {
        let mut quiz = worked_example();
        quiz.profiles.truncate(1);
        let card = WeightedScoring::new("Profilo sconosciuto").score(
            &quiz,
            &[
                Response::single("q1", "opt2"),
                Response::multiple("q2", ["opt3"]),
            ],
        );
        assert_eq!(card.score, 13.0);
        assert_eq!(card.profile, "Profilo sconosciuto");
        assert!(card.profile_description.is_none());
    }

    #[test]
    fn overlapping_ranges_resolve_by_declaration_order() {
        let mut quiz = worked_example();
        quiz.profiles = vec![
            ProfileRange {
                min: 0,
                max: 20,
                profile: "Wide".into(),
                description: String::new(),
            },
            ProfileRange {
                min: 5,
                max: 5,
                profile: "Exact".into(),
                description: String::new(),
            },
        ];
        let card = strategy().score(&quiz, &[Response::single("q1", "opt1")]);
        assert_eq!(card.profile, "Wide");
    }

    #[test]
    fn scoring_is_deterministic() {
        let quiz = quiz(
            vec![
                question("q1", QuestionType::MultipleChoice, vec![option("a", 3.0)], Some("g1")),
                question("q2", QuestionType::Checkbox, vec![option("b", 2.0), option("c", 5.0)], Some("g2")),
            ],
            vec![group("g1", 1.5, 0), group("g2", 0.5, 1)],
        );
        let responses = vec![Response::single("q1", "a"), Response::multiple("q2", ["b", "c"])];
        let first = strategy().score(&quiz, &responses);
        let second = strategy().score(&quiz, &responses);
        assert_eq!(first, second);
    }
}
