//! Deciding whether a minimum is new modulo the 2π phase lattice.
//!
//! Two minima are the same physical state if they differ by an integer
//! lattice translation `2π·n`. No point-group symmetry is assumed for the
//! flux-qubit potential, so only translations are tested.

use crate::normalize::wrap_phase;
use crate::potential::PhaseVector;

/// Distance between two phases on the circle, in [0, π].
pub fn periodic_distance(a: f64, b: f64) -> f64 {
    wrap_phase(a - b).abs()
}

/// True if `a` and `b` coincide within `tolerance` in every coordinate,
/// up to a lattice translation.
pub fn coincide_mod_lattice(a: &PhaseVector, b: &PhaseVector, tolerance: f64) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| periodic_distance(*x, *y) < tolerance)
}

/// True if no element of `existing` coincides with `candidate`.
pub fn is_new<'a, I>(candidate: &PhaseVector, existing: I, tolerance: f64) -> bool
where
    I: IntoIterator<Item = &'a PhaseVector>,
{
    !existing
        .into_iter()
        .any(|known| coincide_mod_lattice(candidate, known, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_translated_copy_is_duplicate() {
        let a = [0.84, -0.84];
        let b = [0.84 + TAU, -0.84 - 2.0 * TAU];
        assert!(coincide_mod_lattice(&a, &b, 1e-6));
        assert!(!is_new(&b, [&a], 1e-6));
    }

    #[test]
    fn test_wraparound_near_pi() {
        // π − ε and −π + ε are 2ε apart on the circle.
        let a = [PI - 1e-7, 0.0];
        let b = [-PI + 1e-7, 0.0];
        assert!(coincide_mod_lattice(&a, &b, 1e-6));
    }

    #[test]
    fn test_distinct_minima() {
        let a = [0.84, -0.84];
        let b = [-0.93, 0.93];
        assert!(!coincide_mod_lattice(&a, &b, 1e-4));
        assert!(is_new(&b, [&a], 1e-4));
    }

    #[test]
    fn test_one_coordinate_match_is_not_enough() {
        let a = [0.5, 1.0];
        let b = [0.5, -1.0];
        assert!(!coincide_mod_lattice(&a, &b, 1e-4));
    }

    #[test]
    fn test_empty_set_everything_new() {
        let none: [&PhaseVector; 0] = [];
        assert!(is_new(&[0.0, 0.0], none, 1e-4));
    }
}
