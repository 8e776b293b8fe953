use rootshift_core::{BacktestConfig, Result, backtest};

use super::format_numbers;

pub struct BacktestCommandConfig<'a> {
    pub input_path: &'a str,
    pub start: usize,
    pub end: usize,
    pub step: usize,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: BacktestCommandConfig<'_>) -> Result<()> {
    let sequence = super::load_sequence(cfg.input_path)?;
    let config = BacktestConfig {
        start: cfg.start,
        end: cfg.end,
        step: cfg.step,
        ..BacktestConfig::default()
    };

    let report = backtest(sequence.draws(), &config)?;
    println!("Backtest over {} steps:", report.steps.len());
    for step in &report.steps {
        if let Some(err) = &step.error {
            println!("  {:>5}  failed: {err}", step.index);
            continue;
        }
        if step.suggestions.is_empty() {
            println!(
                "  {:>5}  target {}  (no suggestions)",
                step.index,
                format_numbers(step.target.values())
            );
            continue;
        }
        println!("  {:>5}  target {}", step.index, format_numbers(step.target.values()));
        for s in &step.suggestions {
            println!(
                "           {:<15} {}  hits {}/6",
                s.strategy.to_string(),
                format_numbers(&s.numbers),
                s.hits
            );
        }
    }

    println!("\nMean hits per strategy:");
    if report.mean_hits.is_empty() {
        println!("  (none)");
    }
    for (strategy, mean) in &report.mean_hits {
        println!("  {:<15} {:.2}/6", strategy.to_string(), mean);
    }

    if let Some(path) = cfg.output_path {
        super::write_json(path, &report)?;
    }
    Ok(())
}
