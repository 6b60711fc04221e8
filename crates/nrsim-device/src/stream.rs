// crates/nrsim-device/src/stream.rs

//! Swappable sources of uniform draws.
//!
//! The device only asks a stream for "the next integer in `[min, max)`";
//! production runs use [`ChaChaStream`], tests substitute a
//! [`ScriptedStream`] to pin exact draw sequences without touching any
//! production code path.

use rand::{Rng as _, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Polymorphic "produce the next integer in range" source.
///
/// Implementations must be deterministic: the same seed followed by the same
/// call sequence yields the same values.
pub trait RandomStream: Send {
    /// Restart the stream from `seed`.
    fn reseed(&mut self, seed: u64);

    /// Next value in `[min, max)`.
    ///
    /// Callers guarantee `min < max`; the device rejects empty ranges before
    /// reaching the stream.
    fn next_in_range(&mut self, min: i64, max: i64) -> i64;
}

/// Seeded ChaCha8 stream (portable across platforms for a fixed crate version).
#[derive(Clone, Debug)]
pub struct ChaChaStream {
    rng: ChaCha8Rng,
}

impl ChaChaStream {
    /// Stream seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomStream for ChaChaStream {
    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    #[inline]
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        self.rng.random_range(min..max)
    }
}

/// Replays a fixed script cyclically; reseeding rewinds it.
///
/// Script values are folded into the requested range by euclidean remainder,
/// so a script of `0, 1, 2` yields exactly those values for `[0, 3)`. An
/// empty script always yields `min`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedStream {
    script: Vec<i64>,
    cursor: usize,
}

impl ScriptedStream {
    /// Stream that replays `script` forever.
    #[must_use]
    pub fn new(script: impl Into<Vec<i64>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// Number of values handed out since construction or the last reseed.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomStream for ScriptedStream {
    fn reseed(&mut self, _seed: u64) {
        self.cursor = 0;
    }

    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        if self.script.is_empty() {
            return min;
        }
        let raw = self.script[self.cursor % self.script.len()];
        self.cursor += 1;

        let span = i128::from(max) - i128::from(min);
        let folded = (i128::from(raw) - i128::from(min)).rem_euclid(span);
        // `folded < span` keeps the sum inside `[min, max)`.
        i64::try_from(i128::from(min) + folded).unwrap_or(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chacha_is_reproducible_and_in_range() {
        let mut a = ChaChaStream::new(12345);
        let mut b = ChaChaStream::new(12345);
        for _ in 0..1000 {
            let x = a.next_in_range(0, 3);
            assert_eq!(x, b.next_in_range(0, 3));
            assert!((0..3).contains(&x));
        }
    }

    #[test]
    fn chacha_reseed_restarts_sequence() {
        let mut s = ChaChaStream::new(7);
        let first: Vec<i64> = (0..16).map(|_| s.next_in_range(-5, 5)).collect();
        s.reseed(7);
        let again: Vec<i64> = (0..16).map(|_| s.next_in_range(-5, 5)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn scripted_cycles_and_folds() {
        let mut s = ScriptedStream::new(vec![0, 1, 2]);
        let got: Vec<i64> = (0..5).map(|_| s.next_in_range(0, 3)).collect();
        assert_eq!(got, vec![0, 1, 2, 0, 1]);
        assert_eq!(s.consumed(), 5);

        let mut s = ScriptedStream::new(vec![7, -1]);
        assert_eq!(s.next_in_range(0, 3), 1);
        assert_eq!(s.next_in_range(0, 3), 2);
        s.reseed(0);
        assert_eq!(s.consumed(), 0);
        assert_eq!(s.next_in_range(10, 12), 11);
    }

    #[test]
    fn empty_script_yields_min() {
        let mut s = ScriptedStream::default();
        assert_eq!(s.next_in_range(4, 9), 4);
    }
}
