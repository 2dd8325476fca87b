//! The `quizkit score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizkit_core::config::load_config_from;
use quizkit_core::model::{Quiz, UserData};
use quizkit_core::parser::parse_quiz;
use quizkit_core::result::{load_responses, QuizResult};
use quizkit_core::session::QuizSession;
use quizkit_report::export::{format_score, result_rows, to_markdown};
use quizkit_report::html::write_html_report;

pub struct ScoreArgs {
    pub quiz: PathBuf,
    pub responses: PathBuf,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub force: bool,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

pub fn execute(args: ScoreArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let quiz = parse_quiz(&args.quiz)?;
    let responses = load_responses(&args.responses)?;
    let given = responses.len();

    let session = QuizSession::resume(&quiz, responses);
    let dropped = given - session.responses().len();
    if dropped > 0 {
        eprintln!("Ignored {dropped} response(s) to unknown, inactive or repeated questions.");
    }

    let user_data = UserData {
        name: args.name,
        email: args.email,
        phone: args.phone,
    };
    let result = if args.force {
        session.force_finish(user_data, &config)?
    } else {
        session
            .finish(user_data, &config)
            .context("cannot score an incomplete quiz (use --force to score anyway)")?
    };

    print_summary(&quiz, &result);

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let id = result.id.to_string();
    let stem = format!(
        "{}-{}-{}",
        quiz.id,
        result.completed_at.format("%Y-%m-%dT%H%M%S"),
        &id[..8]
    );

    let formats: Vec<&str> = if args.format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        args.format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                result.save_json(&path)?;
                eprintln!("Result saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(&quiz, &result, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("{stem}.md"));
                std::fs::write(&path, to_markdown(&result_rows(&quiz, &result)))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Markdown table: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(quiz: &Quiz, result: &QuizResult) {
    use comfy_table::{Cell, Table};

    println!("Quiz: {}", quiz.title);
    println!(
        "Score: {} / {}",
        format_score(result.score),
        format_score(result.max_score)
    );
    println!("Profile: {}", result.profile);
    if let Some(description) = result.profile_description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }

    if !result.group_scores.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Group", "Score", "Max", "%"]);
        for group in &result.group_scores {
            table.add_row(vec![
                Cell::new(&group.title),
                Cell::new(format_score(group.score)),
                Cell::new(format_score(group.max_score)),
                Cell::new(format!("{:.1}%", group.percentage)),
            ]);
        }
        println!("{table}");
    }

    if let Some(fit) = &result.fit {
        println!(
            "Fit: {:.1}% (dominant {} and {})",
            fit.fit_score, fit.dominant[0], fit.dominant[1]
        );
    }
}
