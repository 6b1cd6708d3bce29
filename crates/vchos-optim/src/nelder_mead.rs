//! Nelder–Mead downhill simplex minimizer.
//!
//! Derivative-free; only [`Objective::value`] is called. Useful when the
//! objective has no usable gradient or as a cross-check of [`crate::Bfgs`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{OptimError, OptimResult};
use crate::objective::{Objective, OptimizationResult, Optimizer, check_initial_guess};

/// Nelder–Mead optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NelderMead {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Convergence tolerance on the simplex diameter (max coordinate spread).
    pub xatol: f64,
    /// Convergence tolerance on the spread of objective values.
    pub fatol: f64,
    /// Edge length of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 2000,
            xatol: 1e-9,
            fatol: 1e-12,
            initial_step: 0.25,
        }
    }
}

impl NelderMead {
    /// Create a new Nelder–Mead optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the coordinate and value tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Set the initial simplex edge length.
    #[must_use]
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> OptimResult<()> {
        if self.initial_step.is_nan() || self.initial_step <= 0.0 {
            return Err(OptimError::InvalidSetting {
                name: "initial_step",
                reason: format!("must be positive, got {}", self.initial_step),
            });
        }
        if [self.xatol, self.fatol].iter().any(|t| t.is_nan() || *t < 0.0) {
            return Err(OptimError::InvalidSetting {
                name: "tolerance",
                reason: format!("xatol={} and fatol={} must be non-negative", self.xatol, self.fatol),
            });
        }
        Ok(())
    }
}

impl Optimizer for NelderMead {
    fn minimize<T>(&self, objective: &T, initial_params: &[f64]) -> OptimResult<OptimizationResult>
    where
        T: Objective + ?Sized,
    {
        self.validate()?;
        check_initial_guess(initial_params)?;

        let n = initial_params.len();
        let x0 = initial_params.to_vec();

        let mut simplex: Vec<Vec<f64>> = vec![x0.clone()];
        let mut f_simplex: Vec<f64> = vec![objective.value(&x0)];
        let mut num_evaluations = 1;

        for i in 0..n {
            let mut point = x0.clone();
            point[i] += self.initial_step;
            f_simplex.push(objective.value(&point));
            num_evaluations += 1;
            simplex.push(point);
        }

        let mut converged = false;
        let mut num_iterations = 0;

        for iteration in 0..self.maxiter {
            num_iterations = iteration;

            // Sort simplex by function value; total_cmp keeps NaN from panicking.
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| f_simplex[a].total_cmp(&f_simplex[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            f_simplex = order.iter().map(|&i| f_simplex[i]).collect();

            let f_spread = f_simplex[n] - f_simplex[0];
            let x_spread = simplex[1..]
                .iter()
                .flat_map(|p| p.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0_f64, f64::max);
            if x_spread <= self.xatol && f_spread <= self.fatol {
                converged = true;
                break;
            }

            // Centroid of all points except the worst
            let mut centroid = vec![0.0; n];
            for point in &simplex[..n] {
                for (c, p) in centroid.iter_mut().zip(point) {
                    *c += p;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            let along = |t: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&simplex[n])
                    .map(|(c, w)| c + t * (c - w))
                    .collect()
            };

            // Reflection
            let reflected = along(1.0);
            let f_reflected = objective.value(&reflected);
            num_evaluations += 1;

            if f_reflected < f_simplex[0] {
                // Expansion
                let expanded = along(2.0);
                let f_expanded = objective.value(&expanded);
                num_evaluations += 1;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    f_simplex[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    f_simplex[n] = f_reflected;
                }
            } else if f_reflected < f_simplex[n - 1] {
                // Accept reflection
                simplex[n] = reflected;
                f_simplex[n] = f_reflected;
            } else {
                // Contraction (outside if the reflection improved on the worst point)
                let outside = f_reflected < f_simplex[n];
                let contracted = if outside { along(0.5) } else { along(-0.5) };
                let f_contracted = objective.value(&contracted);
                num_evaluations += 1;

                let threshold = if outside { f_reflected } else { f_simplex[n] };
                if f_contracted <= threshold {
                    simplex[n] = contracted;
                    f_simplex[n] = f_contracted;
                } else {
                    // Shrink towards the best point
                    let best = simplex[0].clone();
                    for i in 1..=n {
                        for (x, b) in simplex[i].iter_mut().zip(&best) {
                            *x = 0.5 * (b + *x);
                        }
                        f_simplex[i] = objective.value(&simplex[i]);
                        num_evaluations += 1;
                    }
                }
            }
            num_iterations = iteration + 1;
        }

        let best = f_simplex
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(i, _)| i);

        trace!(num_iterations, num_evaluations, converged, "nelder-mead finished");

        Ok(OptimizationResult {
            optimal_params: simplex[best].clone(),
            optimal_value: f_simplex[best],
            num_evaluations,
            num_iterations,
            converged,
        })
    }
}
