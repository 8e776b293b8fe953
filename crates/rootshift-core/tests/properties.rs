//! Property tests for the invariants every stage guarantees.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rootshift_core::{
    ChangePoint, DetectionMethod, DetectorConfig, Draw, PeriodicityReport, PipelineConfig,
    SegmentConfig, Signal, detect_change_points, extract_roots, forecast_next_change,
    generate_series, run_pipeline, segment_periods,
};

const MIN_PROPTEST_CASES: u32 = 64;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn draw_strategy() -> impl Strategy<Value = Draw> {
    proptest::sample::subsequence((1u8..=60).collect::<Vec<_>>(), 6)
        .prop_map(|values| Draw::new(&values).unwrap())
}

fn history_strategy(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Draw>> {
    prop::collection::vec(draw_strategy(), len)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn roots_are_n_distinct_ascending_values(
        window in history_strategy(1..40),
        n in 1usize..=12,
    ) {
        let roots = extract_roots(&window, n).unwrap();
        prop_assert_eq!(roots.len(), n);
        prop_assert!(roots.values().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(roots.values().iter().all(|&v| (1..=60).contains(&v)));
    }

    #[test]
    fn change_points_are_increasing_and_separated(
        draws in history_strategy(0..90),
        sensitivity in 0.5f64..3.0,
    ) {
        let config = DetectorConfig {
            sensitivity,
            kmeans_restarts: 2,
            ..DetectorConfig::default()
        };
        let points = detect_change_points(&generate_series(&draws), &config).unwrap();
        for pair in points.windows(2) {
            prop_assert!(pair[1].index > pair[0].index);
            prop_assert!(pair[1].index - pair[0].index >= config.merge_radius);
        }
        prop_assert!(points.iter().all(|cp| cp.index >= 1 && cp.index < draws.len()));
    }

    #[test]
    fn periods_respect_minimum_and_order(
        draws in history_strategy(0..120),
        min_period_len in 1usize..40,
    ) {
        let detector = DetectorConfig {
            method: DetectionMethod::Peaks,
            ..DetectorConfig::default()
        };
        let points = detect_change_points(&generate_series(&draws), &detector).unwrap();
        let config = SegmentConfig {
            min_period_len,
            ..SegmentConfig::default()
        };
        let periods = segment_periods(&draws, &points, &config).unwrap();
        for period in &periods {
            prop_assert!(period.length >= min_period_len);
            prop_assert_eq!(period.length, period.end - period.start);
            prop_assert_eq!(period.roots.len(), config.roots_per_period);
        }
        for pair in periods.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn forecast_never_reports_negative_remaining(
        gaps in prop::collection::vec(1usize..40, 1..8),
        first in 1usize..20,
        tail in 0usize..60,
    ) {
        let mut index = first;
        let mut points = vec![point(index)];
        for gap in gaps {
            index += gap;
            points.push(point(index));
        }
        let sequence_len = index + 1 + tail;
        let periodicity = PeriodicityReport::new();
        let result = forecast_next_change(&points, &periodicity, sequence_len).unwrap();
        prop_assert_eq!(result.last_change_index, index);
        prop_assert!(result.predicted_next_index >= index);
        prop_assert_eq!(
            result.remaining_draws,
            result.predicted_next_index.saturating_sub(sequence_len)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 8,
        .. ProptestConfig::default()
    })]

    #[test]
    fn pipeline_reruns_are_identical(
        draws in history_strategy(40..120),
        seed in any::<u64>(),
    ) {
        let config = PipelineConfig {
            seed: Some(seed),
            ..PipelineConfig::default()
        };
        let first = run_pipeline(&draws, &config).unwrap();
        let second = run_pipeline(&draws, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

fn point(index: usize) -> ChangePoint {
    ChangePoint {
        index,
        signal: Signal::Cluster,
        value_before: 0.0,
        value_after: 1.0,
        method: DetectionMethod::Clustering,
    }
}
