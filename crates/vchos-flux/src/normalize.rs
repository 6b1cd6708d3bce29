//! Folding phase vectors into the fundamental domain (−π, π]².

use std::f64::consts::{PI, TAU};

use crate::potential::PhaseVector;

/// Fold a phase into (−π, π].
///
/// Values already inside the range are returned unchanged, which makes the
/// fold exactly idempotent.
pub fn wrap_phase(phase: f64) -> f64 {
    if phase > -PI && phase <= PI {
        return phase;
    }
    let reduced = phase.rem_euclid(TAU);
    // rem_euclid may round up to TAU itself; both cases land in (−π, 0].
    if reduced > PI { reduced - TAU } else { reduced }
}

/// Fold every coordinate of `phi` into (−π, π].
pub fn normalize(phi: &PhaseVector) -> PhaseVector {
    phi.map(wrap_phase)
}
