//! # rootshift-core
//!
//! **Regime-shift analysis for fixed-size integer draws.**
//!
//! `rootshift-core` takes a chronological history of draws (six distinct
//! integers in `1..=60`), turns it into seven scalar series, finds the points
//! where those series shift, splits the history into stable periods with a
//! small set of characteristic "root" values each, measures periodicity and
//! trend, and forecasts when the next shift is due.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rootshift_core::{Draw, PipelineConfig, run_pipeline};
//!
//! let draws: Vec<Draw> = (0..120u8)
//!     .map(|i| Draw::new(&[i % 10 + 1, 15, 22, 31, 47, 58]))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! let report = run_pipeline(&draws, &PipelineConfig::default()).unwrap();
//! println!("{} change points, {} periods", report.change_points.len(), report.periods.len());
//! if let Some(forecast) = &report.forecast {
//!     println!("next change in {} draws ({})", forecast.remaining_draws, forecast.method);
//! }
//! ```
//!
//! ## Architecture
//!
//! Draws → Series → Change points → Periods (with roots)
//!
//! Series → Periodicity → Forecast (with the change points)
//!
//! Every stage is a plain function over borrowed inputs that returns a fresh
//! result; [`run_pipeline`] chains them into an [`AnalysisReport`]. The only
//! randomness is the k-means initialization in the clustering detector, which
//! is seeded from [`PipelineConfig`], so identical inputs give identical
//! reports.

pub mod backtest;
pub mod cluster;
pub mod detector;
pub mod draw;
pub mod error;
pub mod forecast;
pub mod periodicity;
pub mod pipeline;
pub mod roots;
pub mod segment;
pub mod series;
pub mod stats;
pub mod suggest;
pub mod windows;

pub use backtest::{BacktestConfig, BacktestReport, BacktestStep, ScoredSuggestion, backtest};
pub use detector::{ChangePoint, DetectionMethod, DetectorConfig, Signal, detect_change_points};
pub use draw::{DRAW_SIZE, Draw, MAX_NUMBER, Sequence};
pub use error::{Result, RootShiftError};
pub use forecast::{ForecastMethod, ForecastResult, forecast_next_change};
pub use periodicity::{LagCorrelation, PeriodicityReport, SeriesPeriodicity, analyze_periodicity};
pub use pipeline::{AnalysisReport, PipelineConfig, run_pipeline};
pub use roots::{RootRankings, RootSet, extract_roots, rank_candidates};
pub use segment::{SegmentConfig, StabilityPeriod, segment_periods};
pub use series::{SeriesKind, SeriesMap, generate_series};
pub use suggest::{Strategy, Suggestion, SuggestionConfig, suggest};
pub use windows::{RootShift, RootWindow, WindowConfig, root_shifts, root_windows};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
