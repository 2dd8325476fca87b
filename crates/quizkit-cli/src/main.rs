//! quizkit CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use quizkit_core::error::QuizError;

mod commands;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Branching quiz engine with weighted scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check quiz definitions for authoring mistakes
    Validate {
        /// Path to a quiz file or a directory of quizzes
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Show which questions are active for a set of answers
    Active {
        /// Path to the quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// JSON array of responses recorded so far
        #[arg(long)]
        responses: Option<PathBuf>,
    },

    /// Score a completed response set
    Score {
        /// Path to the quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// JSON array of responses
        #[arg(long)]
        responses: PathBuf,

        /// Respondent name
        #[arg(long, default_value = "")]
        name: String,

        /// Respondent email
        #[arg(long, default_value = "")]
        email: String,

        /// Respondent phone number
        #[arg(long)]
        phone: Option<String>,

        /// Score even if required questions are unanswered
        #[arg(long)]
        force: bool,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Unlock the premium view of a saved result
    Unlock {
        /// Result JSON written by `quizkit score`
        #[arg(long)]
        result: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Active { quiz, responses } => commands::active::execute(quiz, responses),
        Commands::Score {
            quiz,
            responses,
            name,
            email,
            phone,
            force,
            output,
            format,
            config,
        } => commands::score::execute(commands::score::ScoreArgs {
            quiz,
            responses,
            name,
            email,
            phone,
            force,
            output,
            format,
            config,
        }),
        Commands::Unlock { result } => commands::unlock::execute(result),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

/// Exit with 2 when the respondent's answers are at fault, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> i32 {
    let respondent = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<QuizError>())
        .any(QuizError::is_respondent_error);
    if respondent {
        2
    } else {
        1
    }
}
