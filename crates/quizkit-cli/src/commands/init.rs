//! The `quizkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizkit.toml").exists() {
        println!("quizkit.toml already exists, skipping.");
    } else {
        std::fs::write("quizkit.toml", SAMPLE_CONFIG)?;
        println!("Created quizkit.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizzes/example.toml");
    println!("  2. Run: quizkit validate --quiz quizzes/example.toml");
    println!("  3. Run: quizkit score --quiz quizzes/example.toml --responses answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizkit configuration

# Label used when a score falls outside every profile range.
unknown_profile = "Unknown profile"

# Where `quizkit score` writes results and reports.
output_dir = "./quizkit-results"

premium_by_default = false
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example quiz"
description = "A short quiz with one branch"

[[groups]]
id = "habits"
title = "Habits"
weight = 1.0

[[questions]]
id = "q1"
text = "Do you write tests?"
type = "multiple-choice"
required = true
group = "habits"

[[questions.options]]
id = "yes"
text = "Yes"
weight = 5

[[questions.options]]
id = "no"
text = "No"
weight = 0

[[questions]]
id = "q2"
text = "Which kinds?"
type = "checkbox"
required = true
group = "habits"

[[questions.options]]
id = "unit"
text = "Unit tests"
weight = 2

[[questions.options]]
id = "integration"
text = "Integration tests"
weight = 3

[[questions.conditions]]
question = "q1"
operator = "equals"
value = "yes"

[[questions]]
id = "q3"
text = "Anything to add?"
type = "open-ended"

[[profiles]]
min = 0
max = 4
profile = "Getting started"

[[profiles]]
min = 5
max = 10
profile = "Test-minded"
description = "Testing is part of how you work."
"#;
