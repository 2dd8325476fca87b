//! TOML quiz definition parser.
//!
//! Loads quizzes from TOML (or JSON) files and directories, and validates
//! them for authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{
    AnswerOption, Condition, ProfileRange, Question, QuestionGroup, QuestionType, Quiz,
};
use crate::scoring::ScoringMethod;

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    groups: Vec<TomlGroup>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    profiles: Vec<TomlProfile>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    scoring: Option<ScoringMethod>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlGroup {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    order: Option<i32>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    options: Vec<TomlOption>,
    #[serde(default)]
    conditions: Vec<TomlCondition>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
    #[serde(default)]
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct TomlCondition {
    question: String,
    operator: String,
    value: TomlValue,
    #[serde(default)]
    logic: Option<String>,
}

/// Condition values may be written as strings or bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl TomlValue {
    fn into_string(self) -> String {
        match self {
            TomlValue::Text(s) => s,
            TomlValue::Integer(i) => i.to_string(),
            TomlValue::Float(f) => f.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlProfile {
    min: i64,
    max: i64,
    profile: String,
    #[serde(default)]
    description: String,
}

/// Parse a single quiz file. `.json` files are read as a serialized `Quiz`,
/// anything else as TOML.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        return serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()));
    }

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let groups = parsed
        .groups
        .into_iter()
        .enumerate()
        .map(|(i, g)| QuestionGroup {
            id: g.id,
            title: g.title,
            description: g.description,
            weight: g.weight,
            order: g.order.unwrap_or(i as i32),
        })
        .collect();

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionType = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            let conditions = q
                .conditions
                .into_iter()
                .map(|c| {
                    let operator = c
                        .operator
                        .parse()
                        .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
                    let logical_operator = c
                        .logic
                        .map(|l| {
                            l.parse()
                                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))
                        })
                        .transpose()?;
                    Ok(Condition {
                        question_id: c.question,
                        operator,
                        value: c.value.into_string(),
                        logical_operator,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let options = q
                .options
                .into_iter()
                .map(|o| AnswerOption {
                    id: o.id,
                    text: o.text,
                    weight: o.weight,
                })
                .collect();

            Ok(Question {
                id: q.id,
                text: q.text,
                kind,
                options,
                required: q.required,
                conditions,
                image: q.image,
                group_id: q.group,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let profiles = parsed
        .profiles
        .into_iter()
        .map(|p| ProfileRange {
            min: p.min,
            max: p.max,
            profile: p.profile,
            description: p.description,
        })
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        questions,
        groups,
        profiles,
        scoring: parsed.quiz.scoring.unwrap_or_default(),
        created_at: parse_timestamp(parsed.quiz.created_at.as_deref())?,
        updated_at: parse_timestamp(parsed.quiz.updated_at.as_deref())?,
    })
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("invalid timestamp: {s}"))
        })
        .transpose()
}

/// Recursively load all `.toml` and `.json` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    quizzes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn quiz(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }
}

/// Validate a quiz for authoring mistakes. None of these stop the quiz from
/// being taken or scored.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question IDs
    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for (position, question) in quiz.questions.iter().enumerate() {
        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(&option.id) {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!("duplicate option ID: {}", option.id),
                ));
            }
        }

        match question.kind {
            QuestionType::OpenEnded if !question.options.is_empty() => {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    "open-ended question has options, they will be ignored",
                ));
            }
            QuestionType::MultipleChoice | QuestionType::Checkbox if question.options.is_empty() => {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!("{} question has no options", question.kind),
                ));
            }
            _ => {}
        }

        for condition in &question.conditions {
            match quiz.position(&condition.question_id) {
                None => warnings.push(ValidationWarning::question(
                    &question.id,
                    format!(
                        "condition references unknown question: {}",
                        condition.question_id
                    ),
                )),
                Some(p) if p == position => warnings.push(ValidationWarning::question(
                    &question.id,
                    "condition references the question itself and will never be met",
                )),
                Some(p) if p > position => warnings.push(ValidationWarning::question(
                    &question.id,
                    format!(
                        "condition references later question {} and will never be met",
                        condition.question_id
                    ),
                )),
                Some(_) => {}
            }

            if condition.operator.is_numeric() && condition.value.trim().parse::<f64>().is_err() {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!(
                        "{} condition compares against non-numeric value '{}'",
                        condition.operator, condition.value
                    ),
                ));
            }
        }

        if let Some(group_id) = &question.group_id {
            if quiz.group(group_id).is_none() {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!("question references unknown group: {group_id}"),
                ));
            }
        }
    }

    for group in &quiz.groups {
        if group.weight.is_nan() || group.weight <= 0.0 {
            warnings.push(ValidationWarning::quiz(format!(
                "group {} has non-positive weight {}",
                group.id, group.weight
            )));
        }
    }

    warnings.extend(validate_profiles(&quiz.profiles));
    warnings
}

/// Check profile ranges for inverted bounds, overlaps, and gaps.
fn validate_profiles(profiles: &[ProfileRange]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for range in profiles {
        if range.min > range.max {
            warnings.push(ValidationWarning::quiz(format!(
                "profile '{}' has min {} greater than max {}",
                range.profile, range.min, range.max
            )));
        }
    }

    for (i, earlier) in profiles.iter().enumerate() {
        for later in &profiles[i + 1..] {
            if earlier.min <= earlier.max && later.min <= later.max && earlier.overlaps(later) {
                warnings.push(ValidationWarning::quiz(format!(
                    "profiles '{}' and '{}' overlap, '{}' wins",
                    earlier.profile, later.profile, earlier.profile
                )));
            }
        }
    }

    let mut sorted: Vec<&ProfileRange> = profiles.iter().filter(|r| r.min <= r.max).collect();
    sorted.sort_by_key(|r| r.min);
    let mut covered_to: Option<i64> = None;
    for range in sorted {
        if let Some(next) = covered_to.and_then(|end| end.checked_add(1)) {
            if range.min > next {
                warnings.push(ValidationWarning::quiz(format!(
                    "no profile covers scores {} to {}",
                    next,
                    range.min - 1
                )));
            }
        }
        covered_to = Some(covered_to.map_or(range.max, |end| end.max(range.max)));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionOperator, LogicalOperator};
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "skills"
title = "Skills check"
description = "How far along are you?"
created_at = "2024-03-01T10:00:00Z"

[[groups]]
id = "core"
title = "Core"
weight = 2.0

[[questions]]
id = "q1"
text = "Pick one"
type = "multiple-choice"
required = true
group = "core"

[[questions.options]]
id = "opt1"
text = "Some"
weight = 5

[[questions.options]]
id = "opt2"
text = "Lots"
weight = 10

[[questions]]
id = "q2"
text = "Pick any"
type = "checkbox"

[[questions.options]]
id = "opt3"
text = "Three"
weight = 3

[[questions.options]]
id = "opt4"
text = "Seven"
weight = 7

[[questions.conditions]]
question = "q1"
operator = "equals"
value = "opt2"

[[questions.conditions]]
question = "q1"
operator = "not-equals"
value = "opt1"
logic = "OR"

[[profiles]]
min = 0
max = 10
profile = "Beginner"

[[profiles]]
min = 11
max = 40
profile = "Intermediate"
"#;

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(quiz.id, "skills");
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[0].kind, QuestionType::MultipleChoice);
        assert_eq!(quiz.questions[0].options[1].weight, 10.0);
        assert_eq!(quiz.questions[0].group_id.as_deref(), Some("core"));
        assert_eq!(quiz.groups[0].weight, 2.0);
        assert_eq!(quiz.profiles.len(), 2);
        assert!(quiz.created_at.is_some());

        let conditions = &quiz.questions[1].conditions;
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].operator, ConditionOperator::NotEquals);
        assert_eq!(conditions[1].logical_operator, Some(LogicalOperator::Or));
        assert!(matches!(quiz.scoring, ScoringMethod::Weighted));
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_numeric_condition_values() {
        let toml = r#"
[quiz]
id = "numbers"
title = "Numbers"

[[questions]]
id = "age"
text = "Age?"
type = "open-ended"

[[questions]]
id = "follow"
text = "Follow up"
type = "open-ended"

[[questions.conditions]]
question = "age"
operator = "greater-than"
value = 18
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(quiz.questions[1].conditions[0].value, "18");
        assert!(quiz.profiles.is_empty());
    }

    #[test]
    fn parse_scarf_scoring_table() {
        let toml = r#"
[quiz]
id = "scarf"
title = "SCARF"

[quiz.scoring]
type = "scarf"
organization_primary = ["p1"]
organization_secondary = ["s1"]
user = ["u1"]

[quiz.scoring.dimensions]
g1 = "status"
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let ScoringMethod::Scarf(template) = &quiz.scoring else {
            panic!("expected scarf scoring");
        };
        assert_eq!(template.user, vec!["u1"]);
        assert_eq!(template.primary_weight, 2.0);
        assert_eq!(
            template.dimensions.get("g1"),
            Some(&crate::scoring::Dimension::Status)
        );
    }

    #[test]
    fn unknown_question_type_is_an_error() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "q1"
text = "Slide"
type = "slider"
"#;
        let err = parse_quiz_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown question type"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_quiz_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_forward_and_unknown_references() {
        let toml = r#"
[quiz]
id = "refs"
title = "Refs"

[[questions]]
id = "q1"
text = "First"
type = "open-ended"

[[questions.conditions]]
question = "q2"
operator = "equals"
value = "x"

[[questions]]
id = "q2"
text = "Second"
type = "open-ended"

[[questions.conditions]]
question = "nope"
operator = "less-than"
value = "ten"
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("refs.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("later question q2")));
        assert!(warnings.iter().any(|w| w.message.contains("unknown question: nope")));
        assert!(warnings.iter().any(|w| w.message.contains("non-numeric value 'ten'")));
    }

    #[test]
    fn validate_duplicates_and_options() {
        let toml = r#"
[quiz]
id = "dupes"
title = "Dupes"

[[questions]]
id = "same"
text = "First"
type = "multiple-choice"

[[questions]]
id = "same"
text = "Second"
type = "open-ended"
group = "missing"

[[questions.options]]
id = "o"
text = "O"
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question ID")));
        assert!(warnings.iter().any(|w| w.message.contains("has no options")));
        assert!(warnings.iter().any(|w| w.message.contains("will be ignored")));
        assert!(warnings.iter().any(|w| w.message.contains("unknown group: missing")));
    }

    #[test]
    fn validate_profile_overlaps_and_gaps() {
        let profiles = vec![
            ProfileRange {
                min: 0,
                max: 10,
                profile: "A".into(),
                description: String::new(),
            },
            ProfileRange {
                min: 8,
                max: 12,
                profile: "B".into(),
                description: String::new(),
            },
            ProfileRange {
                min: 20,
                max: 30,
                profile: "C".into(),
                description: String::new(),
            },
            ProfileRange {
                min: 5,
                max: 1,
                profile: "D".into(),
                description: String::new(),
            },
        ];
        let warnings = validate_profiles(&profiles);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("'A' and 'B' overlap")));
        assert!(messages.iter().any(|m| m.contains("no profile covers scores 13 to 19")));
        assert!(messages.iter().any(|m| m.contains("'D' has min 5 greater than max 1")));
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn validate_profiles_open_ended_top_range() {
        let profiles = vec![
            ProfileRange {
                min: 0,
                max: i64::MAX,
                profile: "Everyone".into(),
                description: String::new(),
            },
            ProfileRange {
                min: i64::MAX,
                max: i64::MAX,
                profile: "Ceiling".into(),
                description: String::new(),
            },
        ];
        let warnings = validate_profiles(&profiles);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("'Everyone' and 'Ceiling' overlap"));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skills.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "skills");
    }

    #[test]
    fn parse_json_quiz() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.json");
        std::fs::write(&path, serde_json::to_string(&quiz).unwrap()).unwrap();

        let loaded = parse_quiz(&path).unwrap();
        assert_eq!(loaded.questions.len(), 2);
        assert_eq!(loaded.questions[1].conditions[1].logical_operator, Some(LogicalOperator::Or));
    }
}
