//! CLI for rootshift: regime segmentation and change forecasts over draw histories.

mod commands;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rootshift")]
#[command(about = "Find regime shifts, stable periods and root numbers in draw histories")]
#[command(version = rootshift_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: change points, stability periods, periodicity, forecast
    Analyze {
        /// Draw history as JSON (object keyed by contest number, or array of draws)
        #[arg(long)]
        input: String,

        /// Pipeline configuration JSON; flags below override its fields
        #[arg(long)]
        config: Option<String>,

        /// Minimum |z| of a series jump to count as a change point
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Detection method
        #[arg(long, value_parser = ["peaks", "clustering", "combined"])]
        method: Option<String>,

        /// Shortest stability period kept
        #[arg(long)]
        min_period: Option<usize>,

        /// Seed for the clustering detector
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Root numbers over sliding windows and the shifts between them
    Roots {
        #[arg(long)]
        input: String,

        /// Draws per window
        #[arg(long, default_value = "50")]
        window: usize,

        /// Fraction of each window shared with the next, in [0, 1)
        #[arg(long, default_value = "0.5")]
        overlap: f64,

        /// Roots per window
        #[arg(long, default_value = "3")]
        count: usize,

        /// Minimum root difference reported as a shift
        #[arg(long, default_value = "0.5")]
        threshold: f64,
    },

    /// Suggest numbers for the next draw from the current analysis
    Suggest {
        #[arg(long)]
        input: String,

        /// Maximum number of suggestions
        #[arg(long, default_value = "5")]
        count: usize,

        /// Pipeline configuration JSON
        #[arg(long)]
        config: Option<String>,
    },

    /// Walk-forward evaluation of suggestions against later draws
    Backtest {
        #[arg(long)]
        input: String,

        /// First target index
        #[arg(long, default_value = "0")]
        start: usize,

        /// Target index bound (exclusive)
        #[arg(long, default_value = "100")]
        end: usize,

        /// Distance between targets
        #[arg(long, default_value = "10")]
        step: usize,

        /// Write the full backtest as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            config,
            sensitivity,
            method,
            min_period,
            seed,
            output,
        } => commands::analyze::run(commands::analyze::AnalyzeCommandConfig {
            input_path: &input,
            config_path: config.as_deref(),
            sensitivity,
            method: method.as_deref(),
            min_period,
            seed,
            output_path: output.as_deref(),
        }),
        Commands::Roots {
            input,
            window,
            overlap,
            count,
            threshold,
        } => commands::roots::run(commands::roots::RootsCommandConfig {
            input_path: &input,
            window,
            overlap,
            count,
            threshold,
        }),
        Commands::Suggest {
            input,
            count,
            config,
        } => commands::suggest::run(&input, count, config.as_deref()),
        Commands::Backtest {
            input,
            start,
            end,
            step,
            output,
        } => commands::backtest::run(commands::backtest::BacktestCommandConfig {
            input_path: &input,
            start,
            end,
            step,
            output_path: output.as_deref(),
        }),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
