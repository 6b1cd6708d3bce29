//! Josephson potential of the three-junction flux qubit.
//!
//! In the two island phases `φ = (φ₁, φ₂)`:
//!
//!   U(φ) = −EJ1 cos φ₁ − EJ2 cos φ₂ − EJ3 cos(b·φ − 2π f)
//!
//! where `b = [+1, −1]` are the boundary coefficients closing the loop
//! through the third junction and `f` is the flux bias. `U` is 2π-periodic
//! in each phase and 1-periodic in `f`.

use std::f64::consts::TAU;

use vchos_optim::Objective;

use crate::params::DeviceParameters;

/// A point in the two-dimensional phase space.
pub type PhaseVector = [f64; 2];

/// Symmetric 2×2 matrix (curvature, charging energies).
pub type Matrix2 = [[f64; 2]; 2];

/// Number of phase coordinates.
pub const NUM_DEGREES_OF_FREEDOM: usize = 2;

/// Combination of phases entering the flux-dependent cosine term.
pub const BOUNDARY_COEFFICIENTS: [i32; 2] = [1, -1];

/// A flux-biased periodic potential with closed-form derivatives.
///
/// Implementations must be pure and 2π-periodic in every coordinate.
pub trait PotentialProvider {
    /// Potential energy at `phi`.
    fn potential(&self, phi: &PhaseVector) -> f64;

    /// Gradient of the potential at `phi`.
    fn gradient(&self, phi: &PhaseVector) -> PhaseVector;

    /// Hessian of the potential at `phi`.
    fn hessian(&self, phi: &PhaseVector) -> Matrix2;

    /// Flux bias the potential was built for.
    fn flux(&self) -> f64;
}

/// The flux-qubit potential for fixed Josephson energies and flux bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxPotential {
    ej: [f64; 3],
    flux: f64,
}

impl FluxPotential {
    /// Build from Josephson energies `[EJ1, EJ2, EJ3]` and flux bias.
    pub fn new(ej: [f64; 3], flux: f64) -> Self {
        Self { ej, flux }
    }

    /// Build from a full device parameter set.
    pub fn from_params(params: &DeviceParameters) -> Self {
        Self::new(params.ej_list(), params.flux)
    }

    /// Josephson energies.
    pub fn ej(&self) -> [f64; 3] {
        self.ej
    }

    /// Argument of the boundary cosine, `b·φ − 2π f`.
    fn boundary_phase(&self, phi: &PhaseVector) -> f64 {
        let [b1, b2] = BOUNDARY_COEFFICIENTS.map(f64::from);
        b1 * phi[0] + b2 * phi[1] - TAU * self.flux
    }
}

impl PotentialProvider for FluxPotential {
    fn potential(&self, phi: &PhaseVector) -> f64 {
        let [ej1, ej2, ej3] = self.ej;
        -ej1 * phi[0].cos() - ej2 * phi[1].cos() - ej3 * self.boundary_phase(phi).cos()
    }

    fn gradient(&self, phi: &PhaseVector) -> PhaseVector {
        let [ej1, ej2, ej3] = self.ej;
        let coupling = ej3 * self.boundary_phase(phi).sin();
        let b = BOUNDARY_COEFFICIENTS.map(f64::from);
        [
            ej1 * phi[0].sin() + coupling * b[0],
            ej2 * phi[1].sin() + coupling * b[1],
        ]
    }

    fn hessian(&self, phi: &PhaseVector) -> Matrix2 {
        let [ej1, ej2, ej3] = self.ej;
        let coupling = ej3 * self.boundary_phase(phi).cos();
        let b = BOUNDARY_COEFFICIENTS.map(f64::from);
        [
            [ej1 * phi[0].cos() + coupling * b[0] * b[0], coupling * b[0] * b[1]],
            [coupling * b[1] * b[0], ej2 * phi[1].cos() + coupling * b[1] * b[1]],
        ]
    }

    fn flux(&self) -> f64 {
        self.flux
    }
}

/// Exposes a [`PotentialProvider`] to the optimizers with its analytic gradient.
pub struct PotentialObjective<'a, P: ?Sized>(pub &'a P);

impl<P> Objective for PotentialObjective<'_, P>
where
    P: PotentialProvider + ?Sized,
{
    fn value(&self, x: &[f64]) -> f64 {
        self.0.potential(&[x[0], x[1]])
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        self.0.gradient(&[x[0], x[1]]).to_vec()
    }
}
