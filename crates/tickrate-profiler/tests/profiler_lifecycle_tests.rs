//! Tests for full profiler lifecycle scenarios.

use tickrate_profiler::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const TICK_NS: u64 = 50_000_000;

fn feed_clock(profiler: &Profiler, clock: &mut IntervalClock, start_tick: u64, ticks: u64) {
    for tick in start_tick..start_tick + ticks {
        if let Some(sample) = clock.tick(tick * TICK_NS) {
            profiler.observe(sample);
        }
    }
}

#[test]
fn test_interval_source_lifecycle() -> TestResult {
    let config = ProfilerConfig::builder()
        .shortest("2 seconds")
        .history_capacity(20)
        .build()?;
    let profiler = Profiler::try_new(config)?;
    let mut clock = IntervalClock::new();

    // 1. Nothing observed yet
    assert!(profiler.most_recent_sample().is_none());
    assert!(matches!(
        profiler.composite_report(),
        Err(ProfilerError::ReportUnavailable { .. })
    ));

    // 2. The first tick only primes the clock
    feed_clock(&profiler, &mut clock, 0, 1);
    assert_eq!(profiler.observed_count(), 0);

    // 3. Steady 20 TPS
    feed_clock(&profiler, &mut clock, 1, 100);
    let shortest = profiler.snapshot("shortest")?;
    assert_eq!(shortest.sample_count, 40);
    assert_eq!(shortest.name, "2 seconds");
    assert_eq!(shortest.short_name, "2s");
    assert!((shortest.rate - 20.0).abs() < 1e-9);
    assert!((shortest.avg_length_ms - 50.0).abs() < 1e-9);

    // 4. Composite report covers every standard window
    let report = profiler.composite_report()?;
    let names: Vec<&str> = report.snapshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["2 seconds", "1 minutes", "5 minutes", "15 minutes", "1 hours"]
    );

    // 5. History window is bounded separately
    assert_eq!(profiler.last_samples(1_000).len(), 20);
    Ok(())
}

#[test]
fn test_lag_spike_shows_in_shortest_window_only() -> TestResult {
    let profiler = Profiler::default();
    let mut clock = IntervalClock::new();
    feed_clock(&profiler, &mut clock, 0, 2_001);

    // one 1-second tick
    let mut last_ns = 2_000 * TICK_NS;
    last_ns += 1_000_000_000;
    if let Some(sample) = clock.tick(last_ns) {
        profiler.observe(sample);
    }

    let shortest = profiler.snapshot("shortest")?;
    let longest = profiler.snapshot("longest")?;
    assert!((shortest.max_length_ms - 1_000.0).abs() < 1e-6);
    assert!((longest.max_length_ms - 1_000.0).abs() < 1e-6);
    assert!(shortest.rate < longest.rate);
    assert!(shortest.rate < 20.0);

    // after another 100 normal ticks the spike has aged out of the 5 second window
    for _ in 0..100 {
        last_ns += TICK_NS;
        if let Some(sample) = clock.tick(last_ns) {
            profiler.observe(sample);
        }
    }
    let shortest = profiler.snapshot("shortest")?;
    assert!((shortest.max_length_ms - 50.0).abs() < 1e-6);
    assert!((shortest.rate - 20.0).abs() < 1e-9);
    assert!(shortest.rescan_count >= 1);
    Ok(())
}

#[test]
fn test_tick_end_source_lifecycle() -> TestResult {
    let profiler = Profiler::default();
    assert_eq!(profiler.config().source.resolve(true), SourceKind::TickEnd);

    for tick in 1..=40u64 {
        // alternate 10 ms and overrunning 80 ms ticks
        let (duration_ms, remaining_ns) = if tick % 2 == 0 {
            (10.0, 40_000_000)
        } else {
            (80.0, -30_000_000)
        };
        profiler.observe(Sample::from(TickEndEvent {
            tick_number: tick,
            timestamp_ns: tick * TICK_NS,
            duration_ms,
            time_remaining_ns: remaining_ns,
        }));
    }

    let snapshot = profiler.snapshot("shortest")?;
    assert_eq!(snapshot.sample_count, 40);
    // idle tops short ticks up to 50 ms; overrunning ticks have no idle
    assert!((snapshot.min_length_ms - 50.0).abs() < 1e-9);
    assert!((snapshot.max_length_ms - 80.0).abs() < 1e-9);
    assert!((snapshot.avg_length_ms - 65.0).abs() < 1e-9);

    let sample = profiler.sample_by_sequence(39).ok_or("tick 39 missing")?;
    assert!((sample.work_ms() - 80.0).abs() < 1e-9);
    assert!(sample.idle_ms().abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_ad_hoc_measurement_lifecycle() -> TestResult {
    let profiler = Profiler::default();
    let mut clock = IntervalClock::new();
    feed_clock(&profiler, &mut clock, 0, 10);

    // 1. Register before the measured work
    let measurement = profiler.begin_measurement("chunkgen");
    assert!(profiler.contains_window("chunkgen"));
    assert!(measurement.window().is_empty());

    // 2. Work slows the server to 10 TPS
    for tick in 1..=20u64 {
        if let Some(sample) = clock.tick(9 * TICK_NS + tick * 2 * TICK_NS) {
            profiler.observe(sample);
        }
    }

    // 3. Report and remove
    let interim = measurement.snapshot();
    assert!(interim.is_valid());
    let snapshot = measurement.finish();
    assert!(!profiler.contains_window("chunkgen"));
    assert_eq!(snapshot.sample_count, 20);
    assert!((snapshot.rate - 10.0).abs() < 1e-9);
    assert_eq!(snapshot.name, "1.90 seconds");
    assert_eq!(snapshot.short_name, "1.90s");

    // 4. The standard windows saw everything
    assert_eq!(profiler.snapshot("shortest")?.sample_count, 29);
    Ok(())
}

#[test]
fn test_measurement_dropped_without_finish() {
    let profiler = Profiler::default();
    {
        let _measurement = profiler.begin_measurement("spawn");
        assert!(profiler.contains_window("spawn"));
    }
    assert!(!profiler.contains_window("spawn"));
    assert_eq!(profiler.window_count(), 6);
}

#[test]
fn test_unregistering_standard_window_is_reported() {
    let profiler = Profiler::default();
    assert!(profiler.unregister_window("longest"));

    assert_eq!(
        profiler.snapshot_suffix(10),
        Err(ProfilerError::WindowNotFound("longest".to_string()))
    );
    assert!(profiler.debug_report().is_none());
}

#[test]
fn test_invalid_config_file_falls_back() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("profiler.yaml");
    std::fs::write(
        &path,
        "intervals:\n  shortest: \"5 fortnights\"\nhistory_capacity: 10\n",
    )?;

    let config = ProfilerConfig::from_path(&path)?;
    assert!(config.validate().is_err());
    assert!(Profiler::try_new(config.clone()).is_err());

    let profiler = Profiler::new(config);
    let shortest = profiler
        .standard_window(StandardWindow::Shortest)
        .ok_or("shortest window missing")?;
    assert_eq!(shortest.capacity(), Capacity::Bounded(100));
    assert_eq!(shortest.name(), Some("5 seconds"));
    Ok(())
}

#[test]
fn test_zero_length_interval_does_not_starve_profiler() -> TestResult {
    let mut config = ProfilerConfig::default();
    config.intervals.set(StandardWindow::Shortest, "0 seconds");
    config.intervals.set(StandardWindow::Short, "500 milliseconds");
    assert!(config.validate().is_err());

    let profiler = Profiler::new(config);
    let mut clock = IntervalClock::new();
    feed_clock(&profiler, &mut clock, 0, 101);

    let shortest = profiler
        .standard_window(StandardWindow::Shortest)
        .ok_or("shortest window missing")?;
    assert_eq!(shortest.capacity(), Capacity::Bounded(100));
    let short = profiler
        .standard_window(StandardWindow::Short)
        .ok_or("short window missing")?;
    assert_eq!(short.capacity(), Capacity::Bounded(1200));

    let report = profiler.composite_report()?;
    assert_eq!(report.snapshots.len(), 5);
    assert_eq!(
        profiler.most_recent_sample().map(|sample| sample.sequence()),
        Some(100)
    );
    assert!(profiler.sample_by_sequence(60).is_some());
    Ok(())
}

#[test]
fn test_snapshot_serializes_to_json() -> TestResult {
    let profiler = Profiler::default();
    let mut clock = IntervalClock::new();
    feed_clock(&profiler, &mut clock, 0, 21);

    let json = serde_json::to_value(profiler.snapshot("shortest")?)?;
    assert_eq!(json["name"], "5 seconds");
    assert_eq!(json["is_valid"], true);
    assert_eq!(json["sample_count"], 20);
    Ok(())
}
