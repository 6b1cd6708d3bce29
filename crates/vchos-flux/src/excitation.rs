//! Truncation of the oscillator excitations kept at each minimum.
//!
//! A basis state at a minimum is labelled by one excitation number per
//! normal mode. Two truncation schemes are provided:
//!
//! - [`PerModeCutoff`]: each mode independently `0..=num_exc`,
//!   `(num_exc + 1)²` tuples.
//! - [`GlobalExcitationCutoff`]: tuples whose total excitation is at most
//!   `global_exc`, `(g + 1)(g + 2) / 2` tuples, ordered by total and then
//!   lexicographically so that a tuple hashes to its index in closed form.

use serde::{Deserialize, Serialize};

/// Excitation numbers of the two normal modes.
pub type ExcitationTuple = [u32; 2];

/// A truncation scheme for oscillator excitations.
pub trait ExcitationIndexer {
    /// Short name for logs and summaries.
    fn name(&self) -> &'static str;

    /// Number of tuples kept.
    fn len(&self) -> usize;

    /// True if no tuple is kept.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All kept tuples in index order.
    fn tuples(&self) -> Vec<ExcitationTuple>;

    /// Index of `tuple`, or `None` if the truncation drops it.
    fn index_of(&self, tuple: &ExcitationTuple) -> Option<usize>;
}

/// Independent cutoff on every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerModeCutoff {
    /// Highest excitation kept per mode.
    pub num_exc: u32,
}

impl PerModeCutoff {
    /// Create a per-mode cutoff.
    pub fn new(num_exc: u32) -> Self {
        Self { num_exc }
    }

    fn per_mode(&self) -> usize {
        self.num_exc as usize + 1
    }
}

impl ExcitationIndexer for PerModeCutoff {
    fn name(&self) -> &'static str {
        "per-mode"
    }

    fn len(&self) -> usize {
        self.per_mode() * self.per_mode()
    }

    fn tuples(&self) -> Vec<ExcitationTuple> {
        (0..=self.num_exc)
            .flat_map(|n0| (0..=self.num_exc).map(move |n1| [n0, n1]))
            .collect()
    }

    fn index_of(&self, tuple: &ExcitationTuple) -> Option<usize> {
        let [n0, n1] = *tuple;
        if n0 > self.num_exc || n1 > self.num_exc {
            return None;
        }
        Some(n0 as usize * self.per_mode() + n1 as usize)
    }
}

/// Cutoff on the total excitation summed over modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalExcitationCutoff {
    /// Highest total excitation kept.
    pub global_exc: u32,
}

impl GlobalExcitationCutoff {
    /// Create a global cutoff.
    pub fn new(global_exc: u32) -> Self {
        Self { global_exc }
    }
}

/// Number of tuples with total excitation strictly below `total`.
fn tuples_below(total: usize) -> usize {
    total * (total + 1) / 2
}

impl ExcitationIndexer for GlobalExcitationCutoff {
    fn name(&self) -> &'static str {
        "global"
    }

    fn len(&self) -> usize {
        tuples_below(self.global_exc as usize + 1)
    }

    fn tuples(&self) -> Vec<ExcitationTuple> {
        (0..=self.global_exc)
            .flat_map(|total| (0..=total).map(move |n0| [n0, total - n0]))
            .collect()
    }

    fn index_of(&self, tuple: &ExcitationTuple) -> Option<usize> {
        let [n0, n1] = *tuple;
        let total = n0.checked_add(n1)?;
        if total > self.global_exc {
            return None;
        }
        Some(tuples_below(total as usize) + n0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_consistent(indexer: &impl ExcitationIndexer) {
        let tuples = indexer.tuples();
        assert_eq!(tuples.len(), indexer.len());
        for (i, t) in tuples.iter().enumerate() {
            assert_eq!(indexer.index_of(t), Some(i), "tuple {t:?}");
        }
    }

    #[test]
    fn test_per_mode_counts() {
        let cutoff = PerModeCutoff::new(4);
        assert_eq!(cutoff.len(), 25);
        assert_eq!(cutoff.tuples()[0], [0, 0]);
        assert_eq!(cutoff.index_of(&[5, 0]), None);
        check_consistent(&cutoff);
    }

    #[test]
    fn test_global_counts() {
        let cutoff = GlobalExcitationCutoff::new(3);
        assert_eq!(cutoff.len(), 10);
        assert_eq!(&cutoff.tuples()[..4], &[[0, 0], [0, 1], [1, 0], [0, 2]]);
        assert_eq!(cutoff.index_of(&[2, 2]), None);
        assert_eq!(cutoff.index_of(&[u32::MAX, 1]), None);
        check_consistent(&cutoff);
    }

    #[test]
    fn test_global_is_subset_of_per_mode() {
        let global = GlobalExcitationCutoff::new(4);
        let per_mode = PerModeCutoff::new(4);
        assert!(global.len() < per_mode.len());
        for t in global.tuples() {
            assert!(per_mode.index_of(&t).is_some());
        }
    }

    #[test]
    fn test_zero_cutoffs_keep_ground_state() {
        assert_eq!(PerModeCutoff::new(0).tuples(), vec![[0, 0]]);
        assert_eq!(GlobalExcitationCutoff::new(0).tuples(), vec![[0, 0]]);
        assert!(!GlobalExcitationCutoff::new(0).is_empty());
    }
}
