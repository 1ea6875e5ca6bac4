//! `postgate check`: Evaluate one draft without the gate.

use postgate_config::{AppConfig, FileSettingsStore};
use postgate_core::{Draft, EvaluationConfig, Evaluator};
use postgate_providers::LlmEvaluator;

pub async fn run(text: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileSettingsStore::new(config.settings_file());
    let settings = EvaluationConfig::load(&store).await?;

    if !settings.is_complete() {
        eprintln!();
        eprintln!("  Not configured, every draft would be allowed.");
        eprintln!("  Run: postgate configure --prompt \"...\" --api-key sk-...");
        eprintln!();
        return Ok(());
    }

    let evaluator = LlmEvaluator::from_config(&config.provider);
    eprint!("  Checking with {}...", evaluator.model());
    let verdict = evaluator.evaluate(&Draft::new(text), &settings).await?;
    eprint!("\r{}\r", " ".repeat(40));

    if verdict.sendable {
        println!("  ✅ Sendable");
    } else {
        println!("  🚫 Blocked");
    }
    if let Some(score) = verdict.score {
        println!("  Score:     {score:.1} / 10");
    }
    if let Some(reason) = &verdict.reason {
        println!("  Reason:    {reason}");
    }
    if let Some(rephrased) = &verdict.rephrased_text {
        println!("  Suggested: {rephrased}");
    }

    Ok(())
}
