// crates/nrsim-core/src/table.rs

//! Static transition table enforcing the non-adjacency rule structurally.
//!
//! Row `r` lists the candidate successors of value `r`, indexed by a uniform
//! draw in `[0, ALPHABET_SIZE)`. Because no entry of row `r` equals `r`, the
//! generator never needs rejection sampling: every lookup already differs
//! from the previous value.
//!
//! ## Invariants
//! - exactly `ALPHABET_SIZE` rows of exactly `ALPHABET_SIZE` entries;
//! - every entry lies in the alphabet;
//! - no entry in row `r` equals `r`.
//!
//! The default table is asymmetric, so the long-run marginal distribution is
//! not uniform (≈ 40% / 35% / 25%). That is a property of the generator and
//! must not be "corrected" by rebalancing rows.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::{Value, ALPHABET_SIZE};

/// Raw rows of a transition table.
pub type Rows = [[Value; ALPHABET_SIZE]; ALPHABET_SIZE];

/// The table used by the sketch under test.
pub const DEFAULT_ROWS: Rows = [
    [1, 1, 2], // previous 0
    [0, 0, 2], // previous 1
    [0, 1, 0], // previous 2
];

const _: () = assert!(
    rows_are_valid(&DEFAULT_ROWS),
    "default transition table violates the non-adjacency invariant"
);

/// `const` twin of [`TransitionTable::validate_rows`] for fixed-size rows.
const fn rows_are_valid(rows: &Rows) -> bool {
    let mut r = 0;
    while r < ALPHABET_SIZE {
        let mut c = 0;
        while c < ALPHABET_SIZE {
            let v = rows[r][c] as usize;
            if v >= ALPHABET_SIZE || v == r {
                return false;
            }
            c += 1;
        }
        r += 1;
    }
    true
}

/// Immutable, validated `(previous, draw) -> next` lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Value>>", into = "Vec<Vec<Value>>")]
pub struct TransitionTable {
    rows: Rows,
}

impl TransitionTable {
    /// The default table (validated at compile time).
    pub const DEFAULT: Self = Self { rows: DEFAULT_ROWS };

    /// Build a table from fixed-size rows, validating the invariants.
    pub fn new(rows: Rows) -> SimResult<Self> {
        Self::validate_rows(&rows)?;
        Ok(Self { rows })
    }

    /// Validate arbitrary rows against the table invariants.
    ///
    /// Fails with [`SimError::InvalidTable`] if the row count or any row
    /// length differs from the alphabet size, if an entry lies outside the
    /// alphabet, or if row `r` contains `r`.
    pub fn validate_rows<R: AsRef<[Value]>>(rows: &[R]) -> SimResult<()> {
        if rows.len() != ALPHABET_SIZE {
            return Err(SimError::table(format!(
                "expected {ALPHABET_SIZE} rows, found {}",
                rows.len()
            )));
        }
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != ALPHABET_SIZE {
                return Err(SimError::table(format!(
                    "row {r} has {} entries, expected {ALPHABET_SIZE}",
                    row.len()
                )));
            }
            for (c, &v) in row.iter().enumerate() {
                if usize::from(v) >= ALPHABET_SIZE {
                    return Err(SimError::table(format!(
                        "row {r} column {c}: value {v} outside alphabet"
                    )));
                }
                if usize::from(v) == r {
                    return Err(SimError::table(format!(
                        "row {r} column {c}: self-transition {r}->{v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Re-check this table's invariants.
    pub fn validate(&self) -> SimResult<()> {
        Self::validate_rows(&self.rows)
    }

    /// Pure lookup of the successor of `previous` for a given `draw`.
    pub fn next(&self, previous: usize, draw: usize) -> SimResult<Value> {
        if previous >= ALPHABET_SIZE {
            return Err(SimError::IndexOutOfRange {
                what: "previous",
                index: previous,
                bound: ALPHABET_SIZE,
            });
        }
        if draw >= ALPHABET_SIZE {
            return Err(SimError::IndexOutOfRange {
                what: "draw",
                index: draw,
                bound: ALPHABET_SIZE,
            });
        }
        Ok(self.rows[previous][draw])
    }

    /// Borrow the raw rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &Rows {
        &self.rows
    }

    /// Long-run marginal distribution of emitted values under uniform draws.
    ///
    /// Computed by power iteration on the lazy chain `(P + I) / 2`, which has
    /// the same stationary distribution as `P` but is aperiodic, so iteration
    /// converges even for tables whose chain is periodic.
    #[must_use]
    pub fn stationary_distribution(&self) -> [f64; ALPHABET_SIZE] {
        let n = ALPHABET_SIZE as f64;
        let mut p = [[0.0f64; ALPHABET_SIZE]; ALPHABET_SIZE];
        for (r, row) in self.rows.iter().enumerate() {
            for &v in row {
                p[r][usize::from(v)] += 1.0 / n;
            }
        }

        let mut pi = [1.0 / n; ALPHABET_SIZE];
        for _ in 0..10_000 {
            let mut next = [0.0f64; ALPHABET_SIZE];
            for (r, &mass) in pi.iter().enumerate() {
                next[r] += 0.5 * mass;
                for (c, &prob) in p[r].iter().enumerate() {
                    next[c] += 0.5 * mass * prob;
                }
            }
            let delta = pi
                .iter()
                .zip(next.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f64, f64::max);
            pi = next;
            if delta < 1e-13 {
                break;
            }
        }
        pi
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<Vec<Vec<Value>>> for TransitionTable {
    type Error = SimError;

    fn try_from(rows: Vec<Vec<Value>>) -> SimResult<Self> {
        Self::validate_rows(&rows)?;
        let mut fixed: Rows = [[0; ALPHABET_SIZE]; ALPHABET_SIZE];
        for (dst, src) in fixed.iter_mut().zip(rows.iter()) {
            dst.copy_from_slice(src);
        }
        Ok(Self { rows: fixed })
    }
}

impl From<TransitionTable> for Vec<Vec<Value>> {
    fn from(t: TransitionTable) -> Self {
        t.rows.iter().map(|r| r.to_vec()).collect()
    }
}
