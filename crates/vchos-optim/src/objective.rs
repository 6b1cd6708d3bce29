//! Objective functions, optimizer results and the [`Optimizer`] trait.

use serde::{Deserialize, Serialize};

use crate::error::{OptimError, OptimResult};

/// Step used by the central-difference gradient fallback.
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-6;

/// A scalar function of a real vector that can be minimized.
///
/// Implementors with a closed-form gradient should override
/// [`Objective::gradient`]; the default is a central finite difference.
pub trait Objective {
    /// Evaluate the objective at `x`.
    fn value(&self, x: &[f64]) -> f64;

    /// Gradient of the objective at `x`.
    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        central_difference(self, x, FINITE_DIFFERENCE_STEP)
    }
}

/// Adapter turning a plain closure into an [`Objective`].
///
/// ```rust
/// use vchos_optim::{Bfgs, FnObjective, Optimizer};
///
/// let bowl = FnObjective(|x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2));
/// let result = Bfgs::new().minimize(&bowl, &[0.0, 0.0]).unwrap();
/// assert!(result.converged);
/// assert!((result.optimal_params[0] - 1.0).abs() < 1e-6);
/// ```
pub struct FnObjective<F>(pub F);

impl<F> Objective for FnObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, x: &[f64]) -> f64 {
        (self.0)(x)
    }
}

/// Central-difference gradient `(f(x + h e_i) - f(x - h e_i)) / 2h`.
pub fn central_difference<T>(objective: &T, x: &[f64], step: f64) -> Vec<f64>
where
    T: Objective + ?Sized,
{
    let mut probe = x.to_vec();
    (0..x.len())
        .map(|i| {
            probe[i] = x[i] + step;
            let f_plus = objective.value(&probe);
            probe[i] = x[i] - step;
            let f_minus = objective.value(&probe);
            probe[i] = x[i];
            (f_plus - f_minus) / (2.0 * step)
        })
        .collect()
}

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of objective (and gradient) evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// An unconstrained local minimizer.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial_params`.
    ///
    /// Only malformed starting points are errors; a run that hits the
    /// iteration cap still returns its best point with `converged == false`.
    fn minimize<T>(&self, objective: &T, initial_params: &[f64]) -> OptimResult<OptimizationResult>
    where
        T: Objective + ?Sized;
}

/// Reject empty or non-finite starting points.
pub(crate) fn check_initial_guess(initial_params: &[f64]) -> OptimResult<()> {
    if initial_params.is_empty() {
        return Err(OptimError::EmptyInitialGuess);
    }
    if let Some((index, &value)) = initial_params
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(OptimError::NonFiniteInitialGuess { index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_difference_quadratic() {
        let f = FnObjective(|x: &[f64]| 3.0 * x[0] * x[0] + x[0] * x[1]);
        let grad = f.gradient(&[1.0, 2.0]);
        assert!((grad[0] - 8.0).abs() < 1e-6);
        assert!((grad[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_check_initial_guess() {
        assert_eq!(check_initial_guess(&[]), Err(OptimError::EmptyInitialGuess));
        assert!(matches!(
            check_initial_guess(&[0.0, f64::NAN]),
            Err(OptimError::NonFiniteInitialGuess { index: 1, .. })
        ));
        assert!(check_initial_guess(&[0.0, 1.0]).is_ok());
    }
}
