//! Concurrency tests for the profiler and its windows.

use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tickrate_profiler::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn sample(sequence: u64, length_ms: f64) -> Sample {
    #[expect(clippy::cast_precision_loss, reason = "test sequences are small")]
    let timestamp = sequence as f64 * 50.0;
    Sample::new(sequence, timestamp, length_ms)
}

#[test]
fn test_readers_never_see_torn_aggregates() {
    let window = Arc::new(Window::bounded(64));
    let done = Arc::new(AtomicBool::new(false));
    let mut handles = vec![];

    for _ in 0..4 {
        let window = Arc::clone(&window);
        let done = Arc::clone(&done);
        handles.push(thread::spawn(move || {
            let mut checked = 0u64;
            while !done.load(Ordering::Acquire) {
                let snapshot = window.snapshot();
                if snapshot.is_valid() {
                    assert!(snapshot.sample_count <= 64);
                    assert!(snapshot.min_length_ms <= snapshot.avg_length_ms + 1e-9);
                    assert!(snapshot.avg_length_ms <= snapshot.max_length_ms + 1e-9);
                    assert!(snapshot.stddev_length_ms >= 0.0);
                    checked += 1;
                }
                assert!(window.last_samples(16).len() <= 16);
            }
            checked
        }));
    }

    for sequence in 1..=20_000u64 {
        let length = f64::from(u32::try_from(sequence % 97).unwrap_or(0)) + 1.0;
        window.add_sample(sample(sequence, length));
    }
    done.store(true, Ordering::Release);

    for handle in handles {
        assert!(handle.join().is_ok(), "Reader thread should not panic");
    }
    assert_eq!(window.len(), 64);
}

#[test]
fn test_concurrent_registration_during_observe() -> TestResult {
    let profiler = Arc::new(Profiler::default());
    let mut handles = vec![];

    for i in 0..8 {
        let profiler = Arc::clone(&profiler);
        handles.push(thread::spawn(move || {
            let name = format!("adhoc_{i}");
            for _ in 0..50 {
                profiler.register_window(name.clone(), Capacity::Unbounded);
                let _snapshot = profiler.snapshot(&name);
                profiler.unregister_window(&name);
            }
        }));
    }

    for sequence in 1..=2_000u64 {
        profiler.observe(sample(sequence, 50.0));
    }

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    // only the standard and history windows remain
    assert_eq!(profiler.window_count(), 6);
    assert_eq!(profiler.snapshot("shortest")?.sample_count, 100);
    assert_eq!(profiler.observed_count(), 2_000);
    Ok(())
}

#[test]
fn test_concurrent_measurements() {
    let profiler = Arc::new(Profiler::default());
    let ready = Arc::new(Barrier::new(5));
    let done = Arc::new(AtomicBool::new(false));
    let mut handles = vec![];

    for i in 0..4 {
        let profiler = Arc::clone(&profiler);
        let ready = Arc::clone(&ready);
        let done = Arc::clone(&done);
        handles.push(thread::spawn(move || {
            let measurement = profiler.begin_measurement(format!("measure_{i}"));
            ready.wait();
            while !done.load(Ordering::Acquire) {
                let snapshot = measurement.snapshot();
                assert!(snapshot.sample_count <= 200);
            }
            let snapshot = measurement.finish();
            assert_eq!(snapshot.sample_count, 200);
            assert!((snapshot.rate - 20.0).abs() < 1e-6);
        }));
    }

    let producer = {
        let profiler = Arc::clone(&profiler);
        let ready = Arc::clone(&ready);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            ready.wait();
            for sequence in 1..=200u64 {
                profiler.observe(sample(sequence, 50.0));
            }
            done.store(true, Ordering::Release);
        })
    };

    assert!(producer.join().is_ok(), "Producer should not panic");
    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }
    assert_eq!(profiler.window_count(), 6);
}

#[test]
fn test_concurrent_report_queries() -> TestResult {
    let profiler = Arc::new(Profiler::default());
    for sequence in 1..=200u64 {
        profiler.observe(sample(sequence, 50.0));
    }

    let done = Arc::new(AtomicBool::new(false));
    let mut handles = vec![];
    for _ in 0..4 {
        let profiler = Arc::clone(&profiler);
        let done = Arc::clone(&done);
        handles.push(thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let report = profiler.composite_report();
                assert!(report.is_ok_and(|r| r.snapshots.len() == 5));
                let suffix = profiler.snapshot_suffix(40);
                assert!(suffix.is_ok_and(|s| s.sample_count == 40));
                assert!(profiler.most_recent_sample().is_some());
            }
        }));
    }

    for sequence in 201..=5_000u64 {
        profiler.observe(sample(sequence, 50.0));
    }
    done.store(true, Ordering::Release);

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    let report = profiler.composite_report()?;
    for rate in report.rates() {
        assert!((rate - 20.0).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_profiler_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Profiler>();
    assert_send_sync::<Window>();
    assert_send_sync::<Snapshot>();
}
