use rootshift_core::pipeline::{self, AnalysisReport};
use rootshift_core::{DetectionMethod, Result, SeriesKind};

use super::format_numbers;

pub struct AnalyzeCommandConfig<'a> {
    pub input_path: &'a str,
    pub config_path: Option<&'a str>,
    pub sensitivity: Option<f64>,
    pub method: Option<&'a str>,
    pub min_period: Option<usize>,
    pub seed: Option<u64>,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: AnalyzeCommandConfig<'_>) -> Result<()> {
    let sequence = super::load_sequence(cfg.input_path)?;

    let mut config = super::load_config(cfg.config_path)?;
    if let Some(sensitivity) = cfg.sensitivity {
        config.detector.sensitivity = sensitivity;
    }
    if let Some(method) = cfg.method {
        config.detector.method = method.parse::<DetectionMethod>()?;
    }
    if let Some(min_period) = cfg.min_period {
        config.segment.min_period_len = min_period;
    }
    if cfg.seed.is_some() {
        config.seed = cfg.seed;
    }

    let report = pipeline::run_pipeline(sequence.draws(), &config)?;
    print_report(&report);

    if let Some(path) = cfg.output_path {
        super::write_json(path, &report)?;
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "Analyzed {} draws (seed {}, fingerprint {})",
        report.draw_count,
        report.seed,
        &report.fingerprint[..12.min(report.fingerprint.len())]
    );

    println!("\nChange points: {}", report.change_points.len());
    for cp in &report.change_points {
        println!(
            "  {:>5}  {:<10} {:<10} {:>8.3} -> {:.3}",
            cp.index,
            cp.method.name(),
            cp.signal.to_string(),
            cp.value_before,
            cp.value_after
        );
    }

    println!("\nStability periods: {}", report.periods.len());
    for (i, period) in report.periods.iter().enumerate() {
        println!(
            "  #{:<3} [{:>5}, {:>5})  len {:>4}  mean sum {:>6.1}  evens {:.2}  roots {}",
            i + 1,
            period.start,
            period.end,
            period.length,
            period.mean_sum,
            period.mean_even_count,
            format_numbers(period.roots.values())
        );
    }

    println!("\nPeriodicity:");
    for kind in SeriesKind::ALL {
        let Some(analysis) = report.periodicity.get(&kind) else {
            continue;
        };
        let lags = if analysis.periodicity.is_empty() {
            "-".to_string()
        } else {
            analysis
                .periodicity
                .iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let trend = analysis
            .trend
            .map(|t| format!("{t:+.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<10} lags {:<20} trend {}", kind.name(), lags, trend);
    }

    match &report.forecast {
        Some(f) => println!(
            "\nNext change: draw {} ({} draws from now, {}; mean interval {:.1}, median {:.1})",
            f.predicted_next_index,
            f.remaining_draws,
            f.method,
            f.historical_mean_interval,
            f.historical_median_interval
        ),
        None => println!("\nNext change: no forecast"),
    }
    for note in &report.notes {
        println!("  note: {note}");
    }
}
