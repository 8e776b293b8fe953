use rootshift_core::{Result, SuggestionConfig, run_pipeline, suggest};

use super::format_numbers;

pub fn run(input_path: &str, count: usize, config_path: Option<&str>) -> Result<()> {
    let sequence = super::load_sequence(input_path)?;
    let config = super::load_config(config_path)?;
    let report = run_pipeline(sequence.draws(), &config)?;

    let suggestion_config = SuggestionConfig {
        max_suggestions: count,
        ..SuggestionConfig::default()
    };
    let suggestions = suggest(sequence.draws(), &report, &suggestion_config)?;
    if suggestions.is_empty() {
        println!("No stability period found; nothing to suggest.");
        return Ok(());
    }

    if let Some(period) = report.current_period() {
        println!(
            "Current period: [{}, {}) with roots {}",
            period.start,
            period.end,
            format_numbers(period.roots.values())
        );
    }
    if let Some(f) = &report.forecast {
        println!("Next change expected in {} draws ({})", f.remaining_draws, f.method);
    }

    println!("\nSuggestions:");
    for (i, s) in suggestions.iter().enumerate() {
        println!("  {}. {:<15} {}", i + 1, s.strategy.to_string(), format_numbers(&s.numbers));
    }
    Ok(())
}
