//! BFGS quasi-Newton minimizer.
//!
//! Maintains an approximation `H` of the inverse Hessian and steps along
//! `p = -H g`, with a backtracking Armijo line search:
//!
//!   f(x + a p) <= f(x) + c1 · a · gᵀp
//!
//! After the first accepted step `H` is rescaled by `sᵀy / yᵀy`, then
//! updated with the standard rank-two formula
//!
//!   H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ,   ρ = 1 / sᵀy
//!
//! The update is skipped whenever the curvature condition `sᵀy > 0` fails,
//! which keeps `H` positive definite.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{OptimError, OptimResult};
use crate::objective::{Objective, OptimizationResult, Optimizer, check_initial_guess};

/// Smallest line-search step before the search is abandoned.
const MIN_STEP: f64 = 1e-12;

/// Curvature threshold below which the inverse-Hessian update is skipped.
const CURVATURE_EPS: f64 = 1e-12;

/// BFGS optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bfgs {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Convergence threshold on the infinity norm of the gradient.
    pub gtol: f64,
    /// Armijo sufficient-decrease constant.
    pub c1: f64,
    /// Backtracking shrink factor in (0, 1).
    pub backtrack: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            maxiter: 400,
            gtol: 1e-8,
            c1: 1e-4,
            backtrack: 0.5,
        }
    }
}

impl Bfgs {
    /// Create a new BFGS optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the gradient convergence threshold.
    #[must_use]
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> OptimResult<()> {
        if self.gtol.is_nan() || self.gtol <= 0.0 {
            return Err(OptimError::InvalidSetting {
                name: "gtol",
                reason: format!("must be positive, got {}", self.gtol),
            });
        }
        if self.c1.is_nan() || self.c1 <= 0.0 || self.c1 >= 1.0 {
            return Err(OptimError::InvalidSetting {
                name: "c1",
                reason: format!("must lie in (0, 1), got {}", self.c1),
            });
        }
        if self.backtrack.is_nan() || self.backtrack <= 0.0 || self.backtrack >= 1.0 {
            return Err(OptimError::InvalidSetting {
                name: "backtrack",
                reason: format!("must lie in (0, 1), got {}", self.backtrack),
            });
        }
        Ok(())
    }
}

impl Optimizer for Bfgs {
    fn minimize<T>(&self, objective: &T, initial_params: &[f64]) -> OptimResult<OptimizationResult>
    where
        T: Objective + ?Sized,
    {
        self.validate()?;
        check_initial_guess(initial_params)?;

        let n = initial_params.len();
        let mut x = initial_params.to_vec();
        let mut f_x = objective.value(&x);
        let mut grad = objective.gradient(&x);
        let mut num_evaluations = 2;

        let mut h_inv = identity(n);
        let mut rescaled = false;
        let mut converged = false;
        let mut num_iterations = 0;

        for iteration in 0..self.maxiter {
            num_iterations = iteration;
            if inf_norm(&grad) <= self.gtol {
                converged = true;
                break;
            }

            let mut direction: Vec<f64> = mat_vec(&h_inv, &grad).iter().map(|v| -v).collect();
            let mut slope = dot(&grad, &direction);
            if slope >= 0.0 {
                // Not a descent direction: restart from steepest descent.
                h_inv = identity(n);
                direction = grad.iter().map(|g| -g).collect();
                slope = dot(&grad, &direction);
            }

            let mut step = 1.0;
            let (x_new, f_new) = loop {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, pi)| xi + step * pi)
                    .collect();
                let f_candidate = objective.value(&candidate);
                num_evaluations += 1;
                if f_candidate <= f_x + self.c1 * step * slope {
                    break (Some(candidate), f_candidate);
                }
                step *= self.backtrack;
                if step < MIN_STEP {
                    break (None, f_x);
                }
            };
            let Some(x_new) = x_new else {
                trace!(iteration, "line search stalled");
                break;
            };

            let grad_new = objective.gradient(&x_new);
            num_evaluations += 1;

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > CURVATURE_EPS {
                if !rescaled {
                    let scale = sy / dot(&y, &y);
                    h_inv = identity(n);
                    for (i, row) in h_inv.iter_mut().enumerate() {
                        row[i] = scale;
                    }
                    rescaled = true;
                }
                bfgs_update(&mut h_inv, &s, &y, sy);
            }

            x = x_new;
            f_x = f_new;
            grad = grad_new;
            num_iterations = iteration + 1;
        }

        if !converged && inf_norm(&grad) <= self.gtol {
            converged = true;
        }

        trace!(
            num_iterations,
            num_evaluations,
            converged,
            value = f_x,
            "bfgs finished"
        );

        Ok(OptimizationResult {
            optimal_params: x,
            optimal_value: f_x,
            num_evaluations,
            num_iterations,
            converged,
        })
    }
}

// ---------------------------------------------------------------------------
// Dense helpers (problems here are a handful of dimensions)
// ---------------------------------------------------------------------------

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// In-place `H ← H - ρ(Hy sᵀ + s yᵀH) + (ρ² yᵀHy + ρ) s sᵀ`.
fn bfgs_update(h_inv: &mut [Vec<f64>], s: &[f64], y: &[f64], sy: f64) {
    let rho = 1.0 / sy;
    let hy = mat_vec(h_inv, y);
    let yhy = dot(y, &hy);
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            h_inv[i][j] += -rho * (hy[i] * s[j] + s[i] * hy[j]) + (rho * rho * yhy + rho) * s[i] * s[j];
        }
    }
}
