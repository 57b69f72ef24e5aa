//! Property-based tests for window aggregate invariants.

use proptest::prelude::*;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use tickrate_profiler::prelude::*;

fn window_with(capacity: Capacity, lengths: &[f64]) -> Window {
    let window = Window::new(capacity);
    let mut timestamp = 0.0;
    for (sequence, &length) in (1u64..).zip(lengths) {
        timestamp += length;
        window.add_sample(Sample::new(sequence, timestamp, length));
    }
    window
}

fn held_lengths(window: &Window) -> Vec<f64> {
    window.samples().iter().map(Sample::length_ms).collect()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn test_bounded_count_is_min_of_inserted_and_capacity(
        capacity in 0..64usize,
        lengths in prop::collection::vec(0.0..200.0f64, 0..256),
    ) {
        let window = window_with(Capacity::Bounded(capacity), &lengths);
        prop_assert_eq!(window.len(), lengths.len().min(capacity));
    }

    #[test]
    fn test_held_samples_are_the_most_recent(
        capacity in 1..32usize,
        lengths in prop::collection::vec(0.0..200.0f64, 0..128),
    ) {
        let window = window_with(Capacity::Bounded(capacity), &lengths);
        let start = lengths.len().saturating_sub(capacity);
        prop_assert_eq!(held_lengths(&window), lengths.get(start..).unwrap_or_default().to_vec());
    }

    #[test]
    fn test_running_sum_matches_held_samples(
        capacity in 1..32usize,
        lengths in prop::collection::vec(0.0..200.0f64, 1..256),
    ) {
        let window = window_with(Capacity::Bounded(capacity), &lengths);
        let held = held_lengths(&window);
        let exact: f64 = held.iter().sum();
        let exact_squares: f64 = held.iter().map(|l| l * l).sum();

        prop_assert!(approx_eq(window.sum_length_ms(), exact));
        prop_assert!(approx_eq(window.sum_squared_length_ms(), exact_squares));
    }

    #[test]
    fn test_extremes_match_held_samples(
        capacity in 1..16usize,
        lengths in prop::collection::vec(0.0..200.0f64, 1..128),
    ) {
        let window = window_with(Capacity::Bounded(capacity), &lengths);
        let held = held_lengths(&window);
        let min = held.iter().copied().fold(f64::INFINITY, f64::min);
        let max = held.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        prop_assert_eq!(window.min_length_ms(), Some(min));
        prop_assert_eq!(window.max_length_ms(), Some(max));
    }

    #[test]
    fn test_stddev_is_never_negative(
        capacity in 1..64usize,
        lengths in prop::collection::vec(0.0..1000.0f64, 2..128),
    ) {
        let snapshot = window_with(Capacity::Bounded(capacity), &lengths).snapshot();
        prop_assert!(snapshot.stddev_length_ms >= 0.0);
        prop_assert!(!snapshot.stddev_length_ms.is_nan());
    }

    #[test]
    fn test_identical_lengths_have_zero_stddev(
        length in 0.0..1000.0f64,
        count in 2..200usize,
    ) {
        let snapshot = window_with(Capacity::Unbounded, &vec![length; count]).snapshot();
        // E[x²] − E[x]² only cancels to within rounding of length²
        prop_assert!(snapshot.stddev_length_ms <= 1e-5 * length.max(1.0));
    }

    #[test]
    fn test_whole_window_fast_path_matches_scan(
        capacity in 2..64usize,
        lengths in prop::collection::vec(0.0..200.0f64, 2..256),
    ) {
        let window = window_with(Capacity::Bounded(capacity), &lengths);
        let fast = window.snapshot();
        let held = window.samples();
        let scanned = LengthStats::scan(&held);

        prop_assert!(fast.is_valid() == (held.len() >= 2));
        if let (true, Some(scanned)) = (fast.is_valid(), scanned) {
            prop_assert_eq!(fast.sample_count, scanned.count);
            prop_assert!(approx_eq(fast.min_length_ms, scanned.min_ms));
            prop_assert!(approx_eq(fast.max_length_ms, scanned.max_ms));
            prop_assert!(approx_eq(fast.avg_length_ms, scanned.avg_ms));
            prop_assert!((fast.stddev_length_ms - scanned.stddev_ms).abs() < 1e-3);
        }
    }

    #[test]
    fn test_suffix_snapshot_covers_clamped_tail(
        lengths in prop::collection::vec(1.0..200.0f64, 0..64),
        suffix in 0..128usize,
    ) {
        let window = window_with(Capacity::Unbounded, &lengths);
        let snapshot = window.build_snapshot(suffix);
        let covered = suffix.min(lengths.len());

        if covered < 2 {
            prop_assert!(!snapshot.is_valid());
            prop_assert_eq!(snapshot.sample_count, 0);
        } else {
            prop_assert!(snapshot.is_valid());
            prop_assert_eq!(snapshot.sample_count, covered);
            prop_assert_eq!(snapshot.interval_count, covered - 1);
        }
    }

    #[test]
    fn test_interval_sample_count_is_twenty_per_second(seconds in 0..100_000u32) {
        let interval = format!("{seconds} seconds");
        prop_assert_eq!(i64::from(interval_to_samples(&interval)), i64::from(seconds) * 20);
    }
}

#[quickcheck]
fn prop_evicting_extremes_keeps_them_exact(lengths: Vec<u16>, capacity: u8) -> TestResult {
    let capacity = usize::from(capacity % 8) + 1;
    if lengths.len() <= capacity {
        return TestResult::discard();
    }

    let lengths: Vec<f64> = lengths.into_iter().map(f64::from).collect();
    let window = window_with(Capacity::Bounded(capacity), &lengths);
    let held = held_lengths(&window);
    let min = held.iter().copied().fold(f64::INFINITY, f64::min);
    let max = held.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    TestResult::from_bool(
        window.min_length_ms() == Some(min) && window.max_length_ms() == Some(max),
    )
}

#[quickcheck]
fn prop_last_samples_never_exceeds_request(lengths: Vec<u8>, count: u8) -> bool {
    let lengths: Vec<f64> = lengths.into_iter().map(f64::from).collect();
    let window = window_with(Capacity::Unbounded, &lengths);
    let tail = window.last_samples(usize::from(count));
    tail.len() == usize::from(count).min(lengths.len())
}

#[quickcheck]
fn prop_short_name_is_amount_and_unit_letter(amount: u16) -> bool {
    short_interval_name(&format!("{amount} minutes")) == format!("{amount}m")
}
