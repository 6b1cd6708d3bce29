//! Layout of the variational oscillator basis around the located minima.
//!
//! Around each minimum the potential is expanded to second order and the
//! harmonic Hamiltonian
//!
//!   H ≈ 4 nᵀ·EC·n + ½ δφᵀ·U''·δφ
//!
//! has normal-mode frequencies `ω_i = sqrt(λ_i)`, `λ_i` the eigenvalues of
//! `8·EC·U''`. The overlap and matrix-element linear algebra is done by the
//! consumer of [`BasisLayout`]; this module only fixes which states exist
//! and the oscillator frequencies they are built from.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FluxError, FluxResult};
use crate::excitation::{ExcitationIndexer, ExcitationTuple};
use crate::minima::MinimaSet;
use crate::potential::{Matrix2, PhaseVector, PotentialProvider};

/// Harmonic normal modes at one minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalModes {
    /// Eigenvalues of `8·EC·U''`, ascending.
    pub eigenvalues: [f64; 2],
    /// Oscillator frequencies `sqrt(λ)`, ascending.
    pub frequencies: [f64; 2],
}

impl NormalModes {
    /// Normal modes for curvature `hessian` and charging matrix `ec`.
    ///
    /// Fails with [`FluxError::NotPositiveDefinite`] (tagged with `index`)
    /// if the curvature has a non-positive direction.
    pub fn from_curvature(hessian: &Matrix2, ec: &Matrix2, index: usize) -> FluxResult<Self> {
        let m = mat_mul(&scale(ec, 8.0), hessian);
        let trace = m[0][0] + m[1][1];
        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        // EC and U'' are symmetric with EC positive definite, so the
        // eigenvalues are real; clamp rounding noise in the discriminant.
        let disc = (0.25 * trace * trace - det).max(0.0).sqrt();
        let eigenvalues = [0.5 * trace - disc, 0.5 * trace + disc];
        if let Some(&eigenvalue) = eigenvalues.iter().find(|&&l| l.is_nan() || l <= 0.0) {
            return Err(FluxError::NotPositiveDefinite { index, eigenvalue });
        }
        Ok(Self {
            eigenvalues,
            frequencies: eigenvalues.map(f64::sqrt),
        })
    }
}

/// Which oscillator frequencies the states at each minimum use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisStyle {
    /// Every minimum uses the normal modes of the global minimum.
    Plain,
    /// Every minimum uses its own local normal modes.
    Squeezed,
}

/// Assigns normal modes to every minimum.
pub trait BasisBuilder {
    /// The style this builder produces.
    fn style(&self) -> BasisStyle;

    /// Normal modes for each minimum, in minima order.
    fn normal_modes<P>(&self, potential: &P, ec: &Matrix2, minima: &MinimaSet) -> FluxResult<Vec<NormalModes>>
    where
        P: PotentialProvider + ?Sized;
}

/// Plain VCHOS: one set of oscillators, taken at the global minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainBasis;

impl BasisBuilder for PlainBasis {
    fn style(&self) -> BasisStyle {
        BasisStyle::Plain
    }

    fn normal_modes<P>(&self, potential: &P, ec: &Matrix2, minima: &MinimaSet) -> FluxResult<Vec<NormalModes>>
    where
        P: PotentialProvider + ?Sized,
    {
        let Some(global) = minima.global_minimum_index() else {
            return Ok(Vec::new());
        };
        let modes = NormalModes::from_curvature(
            &potential.hessian(minima[global].minimum.phases()),
            ec,
            global,
        )?;
        Ok(vec![modes; minima.len()])
    }
}

/// Squeezed VCHOS: oscillators adapted to the curvature of each well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqueezedBasis;

impl BasisBuilder for SqueezedBasis {
    fn style(&self) -> BasisStyle {
        BasisStyle::Squeezed
    }

    fn normal_modes<P>(&self, potential: &P, ec: &Matrix2, minima: &MinimaSet) -> FluxResult<Vec<NormalModes>>
    where
        P: PotentialProvider + ?Sized,
    {
        minima
            .iter()
            .enumerate()
            .map(|(i, entry)| NormalModes::from_curvature(&potential.hessian(entry.minimum.phases()), ec, i))
            .collect()
    }
}

/// Integer lattice vectors with L1 norm at most `max_len`.
///
/// Ordered by norm, then lexicographically; the zero vector comes first.
/// These are the periodic continuations summed over by matrix elements.
pub fn periodic_vectors(max_len: u32) -> Vec<[i32; 2]> {
    let bound = i32::try_from(max_len).unwrap_or(i32::MAX);
    let mut vectors: Vec<[i32; 2]> = (-bound..=bound)
        .flat_map(|a| {
            let rest = bound - a.abs();
            (-rest..=rest).map(move |b| [a, b])
        })
        .collect();
    vectors.sort_by(|x, y| match l1(x).cmp(&l1(y)) {
        Ordering::Equal => x.cmp(y),
        other => other,
    });
    vectors
}

fn l1(v: &[i32; 2]) -> u32 {
    v[0].unsigned_abs() + v[1].unsigned_abs()
}

/// One basis state: an excitation tuple on the oscillator at a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasisState {
    /// Index into [`BasisLayout::minima`].
    pub minimum_index: usize,
    /// Excitation numbers of the two normal modes.
    pub excitations: ExcitationTuple,
}

/// Everything the matrix-element builder needs to know about the basis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasisLayout {
    /// Style used to assign normal modes; `None` for an empty layout.
    pub style: Option<BasisStyle>,
    /// Name of the excitation truncation scheme.
    pub truncation: String,
    /// Minima positions, in discovery order.
    pub minima: Vec<PhaseVector>,
    /// Normal modes per minimum.
    pub modes: Vec<NormalModes>,
    /// Excitation tuples kept at every minimum.
    pub excitations: Vec<ExcitationTuple>,
    /// Periodic continuation vectors.
    pub periodic_vectors: Vec<[i32; 2]>,
}

impl BasisLayout {
    /// Assemble the layout for `minima` of `potential`.
    pub fn build<P, B, X>(
        potential: &P,
        ec: &Matrix2,
        minima: &MinimaSet,
        builder: &B,
        indexer: &X,
        maximum_periodic_vector_length: u32,
    ) -> FluxResult<Self>
    where
        P: PotentialProvider + ?Sized,
        B: BasisBuilder,
        X: ExcitationIndexer,
    {
        let modes = builder.normal_modes(potential, ec, minima)?;
        let layout = Self {
            style: Some(builder.style()),
            truncation: indexer.name().to_string(),
            minima: minima.to_vec(),
            modes,
            excitations: indexer.tuples(),
            periodic_vectors: periodic_vectors(maximum_periodic_vector_length),
        };
        debug!(
            style = ?builder.style(),
            truncation = indexer.name(),
            minima = layout.minima.len(),
            dimension = layout.dimension(),
            "basis layout built"
        );
        Ok(layout)
    }

    /// Number of basis states.
    pub fn dimension(&self) -> usize {
        self.minima.len() * self.excitations.len()
    }

    /// The state at flat index `index` (minimum-major order).
    pub fn state(&self, index: usize) -> Option<BasisState> {
        let per_minimum = self.excitations.len();
        if index >= self.dimension() {
            return None;
        }
        Some(BasisState {
            minimum_index: index / per_minimum,
            excitations: self.excitations[index % per_minimum],
        })
    }

    /// Flat index of `state`, if it is part of the basis.
    pub fn index_of(&self, state: &BasisState) -> Option<usize> {
        if state.minimum_index >= self.minima.len() {
            return None;
        }
        let offset = self.excitations.iter().position(|t| *t == state.excitations)?;
        Some(state.minimum_index * self.excitations.len() + offset)
    }

    /// Iterate all states in flat-index order.
    pub fn states(&self) -> impl Iterator<Item = BasisState> + '_ {
        (0..self.dimension()).filter_map(|i| self.state(i))
    }
}

fn scale(m: &Matrix2, s: f64) -> Matrix2 {
    m.map(|row| row.map(|x| x * s))
}

fn mat_mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    let mut out = [[0.0; 2]; 2];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_oscillator_frequency() {
        // Decoupled modes: ω = sqrt(8·EC·EJ).
        let ec = [[0.25, 0.0], [0.0, 0.5]];
        let h = [[2.0, 0.0], [0.0, 1.0]];
        let modes = NormalModes::from_curvature(&h, &ec, 0).unwrap();
        assert!((modes.frequencies[0] - 2.0).abs() < 1e-12);
        assert!((modes.frequencies[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_saddle_rejected() {
        let ec = [[0.25, 0.0], [0.0, 0.25]];
        let h = [[0.2, 0.8], [0.8, 0.2]];
        let err = NormalModes::from_curvature(&h, &ec, 3).unwrap_err();
        assert!(matches!(err, FluxError::NotPositiveDefinite { index: 3, .. }));
    }

    #[test]
    fn test_periodic_vectors() {
        assert_eq!(periodic_vectors(0), vec![[0, 0]]);
        let v1 = periodic_vectors(1);
        assert_eq!(v1, vec![[0, 0], [-1, 0], [0, -1], [0, 1], [1, 0]]);
        assert_eq!(periodic_vectors(2).len(), 13);
    }

    #[test]
    fn test_state_index_roundtrip() {
        let layout = BasisLayout {
            style: Some(BasisStyle::Plain),
            truncation: "per-mode".into(),
            minima: vec![[0.8, -0.8], [-0.9, 0.9]],
            modes: Vec::new(),
            excitations: vec![[0, 0], [0, 1], [1, 0]],
            periodic_vectors: vec![[0, 0]],
        };
        assert_eq!(layout.dimension(), 6);
        let state = layout.state(4).unwrap();
        assert_eq!(state.minimum_index, 1);
        assert_eq!(state.excitations, [0, 1]);
        assert_eq!(layout.index_of(&state), Some(4));
        assert_eq!(layout.state(6), None);
        assert_eq!(layout.states().count(), 6);
    }
}
