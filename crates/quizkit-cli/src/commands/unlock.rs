//! The `quizkit unlock` command.

use std::path::PathBuf;

use anyhow::Result;

use quizkit_core::result::QuizResult;

pub fn execute(result_path: PathBuf) -> Result<()> {
    let mut result = QuizResult::load_json(&result_path)?;

    if result.unlock_premium() {
        result.save_json(&result_path)?;
        tracing::info!(result = %result.id, "premium unlocked");
        println!("Premium unlocked for result {}", result.id);
    } else {
        println!("Result {} is already unlocked.", result.id);
    }

    Ok(())
}
