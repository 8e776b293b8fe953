use rootshift_core::{Result, WindowConfig, root_shifts, root_windows};

use super::format_numbers;

pub struct RootsCommandConfig<'a> {
    pub input_path: &'a str,
    pub window: usize,
    pub overlap: f64,
    pub count: usize,
    pub threshold: f64,
}

pub fn run(cfg: RootsCommandConfig<'_>) -> Result<()> {
    let sequence = super::load_sequence(cfg.input_path)?;
    let config = WindowConfig {
        window_len: cfg.window,
        overlap: cfg.overlap,
        roots: cfg.count,
        shift_threshold: cfg.threshold,
    };

    let windows = root_windows(sequence.draws(), &config)?;
    if windows.is_empty() {
        println!(
            "History of {} draws is shorter than one window of {}.",
            sequence.len(),
            config.window_len
        );
        return Ok(());
    }

    println!("Roots per window ({} draws, step {}):", config.window_len, config.step());
    for w in &windows {
        println!("  [{:>5}, {:>5})  {}", w.start, w.end, format_numbers(w.roots.values()));
    }

    let shifts = root_shifts(&windows, config.shift_threshold);
    println!("\nRoot shifts (difference >= {:.2}): {}", config.shift_threshold, shifts.len());
    for s in &shifts {
        println!(
            "  at {:>5}  {} -> {}  ({:.0}% changed)",
            s.index,
            format_numbers(s.previous.values()),
            format_numbers(s.current.values()),
            s.difference * 100.0
        );
    }
    Ok(())
}
