//! Unconstrained local minimizers for the VCHOS minima search.
//!
//! Provides the [`Optimizer`] contract consumed by the minima search:
//!
//! - **BFGS** quasi-Newton with backtracking line search (default)
//! - **Nelder–Mead** downhill simplex (derivative-free)
//!
//! Objectives implement [`Objective`]; a closed-form gradient can be
//! supplied by overriding [`Objective::gradient`], otherwise a central
//! finite difference is used.
//!
//! # Quick start
//!
//! ```rust
//! use vchos_optim::{FnObjective, NelderMead, Optimizer};
//!
//! let f = FnObjective(|x: &[f64]| (x[0] - 3.0).powi(2) + 1.0);
//! let result = NelderMead::new().minimize(&f, &[0.0]).unwrap();
//! assert!((result.optimal_params[0] - 3.0).abs() < 1e-6);
//! assert!((result.optimal_value - 1.0).abs() < 1e-9);
//! ```

pub mod bfgs;
pub mod error;
pub mod nelder_mead;
pub mod objective;

pub use bfgs::Bfgs;
pub use error::{OptimError, OptimResult};
pub use nelder_mead::NelderMead;
pub use objective::{FnObjective, Objective, OptimizationResult, Optimizer, central_difference};
