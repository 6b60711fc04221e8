//! nrsim-bench-harness
//!
//! Run a batch of generator simulations described by a TOML profile and print
//! CSV rows (one per seed plus a summary row) to stdout. If the profile lists
//! candidate tables, a comparison block follows. Nothing is written to disk.
//!
//! Usage examples:
//!   cargo run -p nrsim-bench-harness -- --profile configs/profiles/small.toml
//!   cargo run --release -p nrsim-bench-harness -- --profile configs/profiles/medium.toml --parallel true

use std::path::PathBuf;

use anyhow::{Context, Result};
use nrsim_core::{BatchResult, ComparisonReport, ALPHABET};
use nrsim_harness::{load_profile, SimulationHarness};
use tracing::info;

/// Seeds used when a profile lists none.
const FALLBACK_SEEDS: [u64; 3] = [11111, 22222, 33333];

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn print_batch(batch: &BatchResult) {
    let value_cols: Vec<String> = ALPHABET.iter().map(|v| format!("pct_{v}")).collect();
    println!(
        "row,seed,iterations,elapsed_s,rate_per_s,{},violations,footprint_pct,cycles,digest",
        value_cols.join(",")
    );
    for r in &batch.results {
        let pcts: Vec<String> = ALPHABET
            .iter()
            .map(|v| format!("{:.3}", r.distribution_percentages.get(v).copied().unwrap_or(0.0)))
            .collect();
        println!(
            "run,{},{},{:.6},{:.0},{},{},{:.3},{},{}",
            r.seed_used,
            r.total_iterations,
            r.elapsed_time_seconds,
            r.generation_rate_per_second,
            pcts.join(","),
            r.consecutive_violations,
            r.performance_snapshot.memory_footprint_estimate,
            r.performance_snapshot.cycle_estimate,
            r.sequence_digest
        );
    }

    let agg = &batch.aggregate;
    let means: Vec<String> = ALPHABET
        .iter()
        .map(|v| format!("{:.3}", agg.per_value.get(v).map_or(0.0, |s| s.mean)))
        .collect();
    println!(
        "summary,{},{},{:.6},{:.0},{},{},,,",
        agg.total_runs,
        agg.total_iterations,
        agg.wall_clock_seconds,
        agg.aggregate_throughput,
        means.join(","),
        agg.total_violations
    );
}

fn print_comparison(report: &ComparisonReport) {
    println!("candidate,rate_per_s,footprint_pct,violations,score");
    for e in &report.entries {
        println!(
            "{},{:.0},{:.3},{},{:.4}",
            e.name,
            e.result.generation_rate_per_second,
            e.result.performance_snapshot.memory_footprint_estimate,
            e.result.consecutive_violations,
            e.score
        );
    }
    println!(
        "best,performance={},memory={},distribution={},recommended={}",
        report.best_performance,
        report.best_memory_efficiency,
        report.best_distribution,
        report.recommended
    );
}

fn main() -> Result<()> {
    init_tracing();

    let profile_path = PathBuf::from(parse_flag("profile", "configs/profiles/small.toml"));
    let mut profile = load_profile(&profile_path)?;

    match parse_flag("parallel", "").as_str() {
        "" => {}
        "true" => profile.harness.parallel = true,
        "false" => profile.harness.parallel = false,
        other => anyhow::bail!("unknown --parallel {other} (use true|false)"),
    }
    if profile.seeds.is_empty() {
        profile.seeds = FALLBACK_SEEDS.to_vec();
    }
    info!(
        profile = %profile_path.display(),
        iterations = profile.harness.iterations,
        runs = profile.seeds.len(),
        parallel = profile.harness.parallel,
        "loaded profile"
    );

    let harness = SimulationHarness::default();
    let batch = harness
        .run_batch(&profile.harness, &profile.seeds)
        .context("run batch")?;
    print_batch(&batch);

    if !profile.candidates.is_empty() {
        let report = harness
            .compare_tables(&profile.candidates, &profile.harness)
            .context("compare tables")?;
        println!();
        print_comparison(&report);
    }
    Ok(())
}
