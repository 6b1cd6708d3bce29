//! Canonical minima and the ordered, duplicate-free minima set.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::dedup::is_new;
use crate::normalize::normalize;
use crate::potential::PhaseVector;
use crate::search::DEFAULT_TOLERANCE;

/// A minimum folded into the fundamental domain (−π, π]².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMinimum(PhaseVector);

impl CanonicalMinimum {
    /// Fold a raw optimizer result into the fundamental domain.
    pub fn from_candidate(candidate: &PhaseVector) -> Self {
        Self(normalize(candidate))
    }

    /// The phase coordinates.
    pub fn phases(&self) -> &PhaseVector {
        &self.0
    }
}

impl fmt::Display for CanonicalMinimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.6}, {:+.6})", self.0[0], self.0[1])
    }
}

/// Which seed of the search produced a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrigin {
    /// The anchor seed at (or near) the origin.
    Anchor,
    /// Ramp step `k`; negative `k` walks the other way along the diagonal.
    Ramp {
        /// Signed step index.
        step: i32,
    },
}

impl SeedOrigin {
    /// Distinct non-negative number per seed, used to derive retry RNG streams.
    pub fn ordinal(&self) -> u64 {
        match *self {
            SeedOrigin::Anchor => 0,
            SeedOrigin::Ramp { step } => 2 * u64::from(step.unsigned_abs()) - u64::from(step > 0),
        }
    }
}

impl fmt::Display for SeedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOrigin::Anchor => write!(f, "anchor"),
            SeedOrigin::Ramp { step } => write!(f, "ramp {step:+}"),
        }
    }
}

/// One located minimum with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumEntry {
    /// Canonical location.
    pub minimum: CanonicalMinimum,
    /// Raw optimizer result before folding.
    pub raw: PhaseVector,
    /// Potential energy at the minimum.
    pub energy: f64,
    /// Seed that produced it.
    pub origin: SeedOrigin,
    /// Convergence flag reported by the optimizer.
    pub converged: bool,
}

impl MinimumEntry {
    /// Unconverged results are kept but marked low-confidence.
    pub fn is_low_confidence(&self) -> bool {
        !self.converged
    }
}

/// Minima in discovery order, pairwise distinct modulo the 2π lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimaSet {
    entries: Vec<MinimumEntry>,
    tolerance: f64,
}

impl Default for MinimaSet {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl MinimaSet {
    /// An empty set using `tolerance` for duplicate detection.
    pub fn new(tolerance: f64) -> Self {
        Self {
            entries: Vec::new(),
            tolerance,
        }
    }

    /// Append without a duplicate check. Only the anchor goes in this way.
    pub(crate) fn push_anchor(&mut self, entry: MinimumEntry) {
        self.entries.push(entry);
    }

    /// Append `entry` if it is new; returns whether it was appended.
    pub fn insert_if_new(&mut self, entry: MinimumEntry) -> bool {
        let fresh = self.is_new(entry.minimum.phases());
        if fresh {
            self.entries.push(entry);
        }
        fresh
    }

    /// True if `candidate` matches no element of the set.
    pub fn is_new(&self, candidate: &PhaseVector) -> bool {
        let folded = normalize(candidate);
        is_new(&folded, self.positions(), self.tolerance)
    }

    /// Tolerance used for duplicate detection.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of minima.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set holds no minima.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in discovery order.
    pub fn entries(&self) -> &[MinimumEntry] {
        &self.entries
    }

    /// Iterate entries in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, MinimumEntry> {
        self.entries.iter()
    }

    /// Canonical phase coordinates in discovery order.
    pub fn positions(&self) -> impl Iterator<Item = &PhaseVector> {
        self.entries.iter().map(|e| e.minimum.phases())
    }

    /// Canonical phase coordinates as plain data.
    pub fn to_vec(&self) -> Vec<PhaseVector> {
        self.positions().copied().collect()
    }

    /// Index of the lowest-energy minimum (first on ties).
    pub fn global_minimum_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.energy.total_cmp(&b.energy))
            .map(|(i, _)| i)
    }

    /// Number of entries flagged low-confidence.
    pub fn low_confidence_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_low_confidence()).count()
    }
}

impl Index<usize> for MinimaSet {
    type Output = MinimumEntry;

    fn index(&self, index: usize) -> &MinimumEntry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a MinimaSet {
    type Item = &'a MinimumEntry;
    type IntoIter = std::slice::Iter<'a, MinimumEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
