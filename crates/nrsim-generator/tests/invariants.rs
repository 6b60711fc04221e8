//! Sequence-level invariants of the generator over arbitrary seeds.

use std::collections::BTreeSet;

use nrsim_core::{TransitionTable, ALPHABET};
use nrsim_device::{DeviceMock, ScriptedStream};
use nrsim_generator::ConstraintSequenceGenerator;
use proptest::prelude::*;

fn run(seed: u64, n: usize) -> Vec<u8> {
    ConstraintSequenceGenerator::new(seed)
        .generate_many(n)
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    #[test]
    fn no_adjacent_repeats(seed in any::<u64>(), n in 2usize..2_000) {
        let seq = run(seed, n);
        prop_assert_eq!(seq.len(), n);
        for w in seq.windows(2) {
            prop_assert_ne!(w[0], w[1]);
        }
    }

    #[test]
    fn values_stay_in_alphabet(seed in any::<u64>(), n in 1usize..2_000) {
        prop_assert!(run(seed, n).iter().all(|v| ALPHABET.contains(v)));
    }

    #[test]
    fn same_seed_same_sequence(seed in any::<u64>(), n in 1usize..1_000) {
        prop_assert_eq!(run(seed, n), run(seed, n));
    }
}

#[test]
fn all_six_transitions_occur() {
    for seed in [12345u64, 54321, 98765] {
        let seq = run(seed, 5_000);
        let seen: BTreeSet<(u8, u8)> = seq.windows(2).map(|w| (w[0], w[1])).collect();
        let expected: BTreeSet<(u8, u8)> =
            [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)].into_iter().collect();
        assert_eq!(seen, expected, "seed {seed}");
    }
}

#[test]
fn footprint_stays_bounded_after_5000_generations() {
    let mut g = ConstraintSequenceGenerator::new(2024);
    g.generate_many(5_000).unwrap();
    let snap = g.device().snapshot_stats();
    assert!(snap.memory_footprint_estimate < 50.0, "{snap:?}");
    assert_eq!(snap.instruction_count, 5_000);
}

#[test]
fn marginal_distribution_matches_table_not_uniform() {
    let seq = run(777, 60_000);
    let expected = TransitionTable::DEFAULT.stationary_distribution();
    for (v, &p) in expected.iter().enumerate() {
        let share = seq.iter().filter(|&&x| usize::from(x) == v).count() as f64 / seq.len() as f64;
        assert!((share - p).abs() < 0.02, "value {v}: observed {share}, expected {p}");
    }
}

#[test]
fn concrete_scripted_scenario() {
    let dev = DeviceMock::seeded(ScriptedStream::new(vec![0, 1, 2]), 0);
    let mut g = ConstraintSequenceGenerator::with_device(dev, TransitionTable::DEFAULT);
    let seq = g.generate_many(5).unwrap();
    assert_eq!(seq, vec![0, 1, 2, 0, 1]);
    assert!(seq.windows(2).all(|w| w[0] != w[1]));
}
