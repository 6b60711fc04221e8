//! End-to-end behavior of the harness: batches, determinism, progress,
//! comparisons and the serialized record shape.

use std::sync::{Arc, Mutex};

use nrsim_core::{SimError, TransitionTable};
use nrsim_harness::{HarnessConfig, Progress, SimulationHarness, TableCandidate};

const SEEDS: [u64; 3] = [11111, 22222, 33333];

fn cfg(iterations: u64) -> HarnessConfig {
    HarnessConfig::default().with_iterations(iterations)
}

#[test]
fn batch_preserves_seed_order_and_aggregates() {
    let batch = SimulationHarness::default()
        .run_batch(&cfg(10_000), &SEEDS)
        .unwrap();

    let seeds: Vec<u64> = batch.results.iter().map(|r| r.seed_used).collect();
    assert_eq!(seeds, SEEDS);

    let agg = &batch.aggregate;
    assert_eq!(agg.total_runs, 3);
    assert_eq!(agg.total_iterations, 30_000);
    assert_eq!(agg.total_violations, 0);
    assert!(agg.all_constraints_satisfied);
    assert!(agg.aggregate_throughput > 0.0);
    assert_eq!(agg.combined_counts.values().sum::<u64>(), 30_000);

    for (v, s) in &agg.per_value {
        assert!(s.min <= s.mean && s.mean <= s.max, "value {v}: {s:?}");
        assert!(s.variance >= 0.0);
    }
    // Only the six cross transitions ever occur.
    assert_eq!(agg.combined_transitions.len(), 6);
    assert!(agg.combined_transitions.keys().all(|k| {
        let (a, b) = k.split_once("->").unwrap();
        a != b
    }));
}

#[test]
fn zero_iterations_is_rejected_before_any_run() {
    let calls = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&calls);
    let harness = SimulationHarness::default()
        .with_observer(Arc::new(move |_: &Progress| *sink.lock().unwrap() += 1));

    let bad = cfg(0).with_progress(None);
    assert!(matches!(harness.run_single(&bad), Err(SimError::InvalidConfig(_))));
    assert!(matches!(
        harness.run_batch(&bad, &SEEDS),
        Err(SimError::InvalidConfig(_))
    ));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn oversized_batch_fails_cleanly_without_running() {
    let calls = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&calls);
    let harness = SimulationHarness::default()
        .with_observer(Arc::new(move |_: &Progress| *sink.lock().unwrap() += 1));

    let huge = cfg(u64::MAX).with_progress(Some(1));
    assert!(matches!(harness.run_single(&huge), Err(SimError::InvalidConfig(_))));
    assert!(matches!(
        harness.run_batch(&huge.with_parallel(true), &SEEDS),
        Err(SimError::InvalidConfig(_))
    ));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[test]
fn per_call_generation_time_is_reported() {
    let r = SimulationHarness::default()
        .run_single(&cfg(2_000).with_seed(Some(5)))
        .unwrap();
    let t = r.generation_timing;
    assert!(t.min_micros >= 0.0);
    assert!(t.min_micros <= t.avg_micros && t.avg_micros <= t.max_micros, "{t:?}");
    // Per-call time cannot exceed the whole run.
    assert!(t.avg_micros * 2_000.0 <= r.elapsed_time_seconds * 1e6 + 1e-3);

    let json = serde_json::to_value(&r).unwrap();
    let timing = &json["generationTiming"];
    for key in ["avgMicros", "minMicros", "maxMicros"] {
        assert!(timing.get(key).is_some(), "missing {key}");
    }
    assert_eq!(
        r.without_timing().generation_timing,
        nrsim_core::GenerationTiming::default()
    );
}

#[test]
fn batch_averages_per_run_generation_time() {
    let batch = SimulationHarness::default()
        .run_batch(&cfg(2_000), &SEEDS)
        .unwrap();
    let n = batch.results.len() as f64;
    let mean = |f: fn(&nrsim_core::GenerationTiming) -> f64| {
        batch.results.iter().map(|r| f(&r.generation_timing)).sum::<f64>() / n
    };
    let avg = batch.aggregate.average_generation_timing;
    assert!((avg.avg_micros - mean(|t| t.avg_micros)).abs() < 1e-9);
    assert!((avg.min_micros - mean(|t| t.min_micros)).abs() < 1e-9);
    assert!((avg.max_micros - mean(|t| t.max_micros)).abs() < 1e-9);
    assert!(avg.min_micros <= avg.max_micros);
}

#[test]
fn empty_seed_list_is_rejected() {
    let err = SimulationHarness::default()
        .run_batch(&cfg(10), &[])
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[test]
fn identical_seed_reproduces_everything_but_timing() {
    let harness = SimulationHarness::default();
    let c = cfg(5_000).with_seed(Some(98765));
    let a = harness.run_single(&c).unwrap();
    let b = harness.run_single(&c).unwrap();
    assert_eq!(a.without_timing(), b.without_timing());
    assert_eq!(a.sequence_digest, b.sequence_digest);
}

#[test]
fn parallel_batch_matches_sequential() {
    let harness = SimulationHarness::default();
    let seeds: Vec<u64> = (1..=8).map(|i| i * 1_000_003).collect();
    let seq = harness.run_batch(&cfg(3_000), &seeds).unwrap();
    let par = harness
        .run_batch(&cfg(3_000).with_parallel(true), &seeds)
        .unwrap();

    assert_eq!(seq.results.len(), par.results.len());
    for (s, p) in seq.results.iter().zip(&par.results) {
        assert_eq!(s.without_timing(), p.without_timing());
    }
    assert_eq!(seq.aggregate.combined_counts, par.aggregate.combined_counts);
}

#[test]
fn progress_fires_every_interval_and_on_completion() {
    let seen: Arc<Mutex<Vec<Progress>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let harness = SimulationHarness::default()
        .with_observer(Arc::new(move |p: &Progress| sink.lock().unwrap().push(*p)));

    harness
        .run_single(&cfg(1_050).with_seed(Some(3)).with_progress(Some(250)))
        .unwrap();

    let seen = seen.lock().unwrap();
    let completed: Vec<u64> = seen.iter().map(|p| p.completed).collect();
    assert_eq!(completed, vec![250, 500, 750, 1_000, 1_050]);
    assert!(seen.iter().all(|p| p.seed == 3 && p.total == 1_050));
    assert!(seen.last().unwrap().is_complete());
}

#[test]
fn default_progress_interval_is_ten_percent() {
    let count = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&count);
    let harness = SimulationHarness::default()
        .with_observer(Arc::new(move |_: &Progress| *sink.lock().unwrap() += 1));

    harness
        .run_single(&cfg(1_000).with_seed(Some(1)).with_progress(None))
        .unwrap();
    assert_eq!(*count.lock().unwrap(), 10);

    // Disabled progress stays silent.
    harness.run_single(&cfg(1_000).with_seed(Some(1))).unwrap();
    assert_eq!(*count.lock().unwrap(), 10);
}

#[test]
fn long_run_stays_within_memory_budget() {
    let r = SimulationHarness::default()
        .run_single(&cfg(5_000).with_seed(Some(12345)))
        .unwrap();
    assert!(r.performance_snapshot.memory_footprint_estimate < 50.0);
    assert_eq!(r.unique_transitions, 6);
    assert_eq!(r.performance_snapshot.function_call_counts["random"], 5_000);
}

#[test]
fn observed_distribution_tracks_expected() {
    let r = SimulationHarness::default()
        .run_single(&cfg(60_000).with_seed(Some(777)))
        .unwrap();
    for (v, expected) in &r.expected_percentages {
        let observed = r.distribution_percentages[v];
        assert!(
            (observed - expected).abs() < 2.0,
            "value {v}: observed {observed:.2}% expected {expected:.2}%"
        );
    }
}

#[test]
fn result_serializes_with_stable_field_names() {
    let r = SimulationHarness::default()
        .run_single(&cfg(100).with_seed(Some(42)))
        .unwrap();
    let json = serde_json::to_value(&r).unwrap();
    for key in [
        "seedUsed",
        "totalIterations",
        "elapsedTimeSeconds",
        "generationRatePerSecond",
        "distributionPercentages",
        "consecutiveViolations",
        "constraintSatisfied",
        "performanceSnapshot",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    let snap = &json["performanceSnapshot"];
    assert!(snap.get("instructionCount").is_some());
    assert!(snap.get("functionCallCounts").is_some());
    assert!(snap.get("memoryFootprintEstimate").is_some());
    assert_eq!(json["seedUsed"], 42);

    let back: nrsim_core::SimulationResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.seed_used, r.seed_used);
    assert_eq!(back.sample_sequence, r.sample_sequence);
    assert_eq!(back.sequence_digest, r.sequence_digest);
}

#[test]
fn comparison_ranks_candidates_under_one_seed() {
    let rotating = TransitionTable::new([[1, 2, 1], [2, 0, 2], [0, 1, 0]]).unwrap();
    let candidates = vec![
        TableCandidate::new("default", TransitionTable::DEFAULT),
        TableCandidate::new("rotating", rotating),
    ];
    let report = SimulationHarness::default()
        .compare_tables(&candidates, &cfg(20_000).with_seed(Some(2024)))
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].name, "default");
    assert_eq!(report.entries[1].rows, vec![vec![1, 2, 1], vec![2, 0, 2], vec![0, 1, 0]]);
    assert!(report.entries.iter().all(|e| e.result.seed_used == 2024));
    assert!(report.entries.iter().all(|e| e.result.constraint_satisfied));
    assert!(report
        .entries
        .iter()
        .all(|e| e.score > 0.0 && e.score <= 1.0 + 1e-9));

    // Both tables issue the same primitives, so memory ties go to the first.
    assert_eq!(report.best_memory_efficiency, "default");
    let names = ["default", "rotating"];
    assert!(names.contains(&report.best_performance.as_str()));
    assert!(names.contains(&report.recommended.as_str()));
}

#[test]
fn comparison_without_candidates_is_rejected() {
    let err = SimulationHarness::default()
        .compare_tables(&[], &cfg(10))
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}
