//! Minima search over the multi-well flux-qubit potential.
//!
//! The search runs a local optimizer from a fixed sequence of seeds:
//!
//! 1. **Anchor** at the origin, or at [`FRUSTRATION_SEED`] when the flux
//!    sits exactly on the frustration point (the origin is then a saddle
//!    the optimizer cannot leave). Always accepted.
//! 2. **Ramp**: for `k = 1, 2, …, max_depth` a positive seed
//!    `(s·2πk/d, 2πk/d)` and a negative seed at `−k`, walking outward along
//!    the diagonal on which the wells line up. `s` is [`RAMP_SLOPE`], `d`
//!    is [`RAMP_DIVISOR`].
//! 3. Each ramp result is folded into (−π, π]² and appended if new.
//! 4. The ramp stops after the first step where either direction found
//!    nothing new.
//!
//! The stopping rule is a plateau heuristic: minima beyond the stopping
//! point or between sparse seeds can be missed.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vchos_optim::{Bfgs, OptimizationResult, Optimizer};

use crate::error::{FluxError, FluxResult};
use crate::minima::{CanonicalMinimum, MinimaSet, MinimumEntry, SeedOrigin};
use crate::potential::{PhaseVector, PotentialObjective, PotentialProvider};

/// Slope of the ramp diagonal. Steeper than 1 so the seed for each step
/// lands inside a well's basin rather than on the ridge between wells.
pub const RAMP_SLOPE: f64 = 1.15;

/// The wells along the ramp are spaced by roughly `2π / RAMP_DIVISOR`.
pub const RAMP_DIVISOR: f64 = 3.0;

/// Number of ramp steps tried in each direction.
pub const MAX_RAMP_DEPTH: u32 = 3;

/// Per-coordinate tolerance for treating two minima as the same.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Flux bias at which the origin becomes a symmetric saddle.
pub const FRUSTRATION_FLUX: f64 = 0.5;

/// Anchor seed used at the frustration point, off the symmetric saddle.
pub const FRUSTRATION_SEED: PhaseVector = [0.15, 0.10];

/// Anchor seed everywhere else.
pub const ORIGIN_SEED: PhaseVector = [0.0, 0.0];

/// What to do when the local optimizer reports non-convergence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ConvergencePolicy {
    /// Use the result as-is.
    #[default]
    Ignore,
    /// Use the result, mark it low-confidence and log a warning.
    Flag,
    /// Restart from randomly perturbed seeds; flag the last attempt if none converges.
    Retry {
        /// Number of extra attempts.
        attempts: u32,
        /// Half-width of the uniform perturbation applied to each coordinate.
        radius: f64,
        /// Base seed of the perturbation RNG.
        seed: u64,
    },
    /// Fail the search with [`FluxError::DidNotConverge`].
    Strict,
}

/// Tuning knobs of the minima search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Slope of the ramp diagonal.
    pub ramp_slope: f64,
    /// Divisor of 2π giving the ramp step length.
    pub ramp_divisor: f64,
    /// Number of ramp steps in each direction.
    pub max_depth: u32,
    /// Duplicate-detection tolerance per coordinate.
    pub tolerance: f64,
    /// Anchor seed used at the frustration point.
    pub frustration_seed: PhaseVector,
    /// Optimize all ramp seeds in parallel before deduplicating in order.
    pub parallel: bool,
    /// Handling of unconverged optimizer runs.
    pub convergence: ConvergencePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ramp_slope: RAMP_SLOPE,
            ramp_divisor: RAMP_DIVISOR,
            max_depth: MAX_RAMP_DEPTH,
            tolerance: DEFAULT_TOLERANCE,
            frustration_seed: FRUSTRATION_SEED,
            parallel: false,
            convergence: ConvergencePolicy::Ignore,
        }
    }
}

impl SearchConfig {
    /// Set the ramp depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the duplicate-detection tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable or disable parallel seed evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the convergence policy.
    #[must_use]
    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.convergence = convergence;
        self
    }

    /// Check every knob is in range.
    pub fn validate(&self) -> FluxResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(FluxError::InvalidSearchConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if !(self.ramp_divisor.is_finite() && self.ramp_divisor != 0.0) {
            return Err(FluxError::InvalidSearchConfig(format!(
                "ramp_divisor must be finite and non-zero, got {}",
                self.ramp_divisor
            )));
        }
        if !self.ramp_slope.is_finite() {
            return Err(FluxError::InvalidSearchConfig(format!(
                "ramp_slope must be finite, got {}",
                self.ramp_slope
            )));
        }
        if !self.frustration_seed.iter().all(|x| x.is_finite()) {
            return Err(FluxError::InvalidSearchConfig(
                "frustration_seed must be finite".into(),
            ));
        }
        if let ConvergencePolicy::Retry { radius, .. } = self.convergence {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(FluxError::InvalidSearchConfig(format!(
                    "retry radius must be positive and finite, got {radius}"
                )));
            }
        }
        Ok(())
    }

    /// Anchor seed for the given flux bias.
    ///
    /// The flux is reduced modulo 1 before comparing with the frustration
    /// point, since the potential is 1-periodic in flux.
    pub fn anchor_seed(&self, flux: f64) -> PhaseVector {
        if flux.rem_euclid(1.0) == FRUSTRATION_FLUX {
            self.frustration_seed
        } else {
            ORIGIN_SEED
        }
    }

    /// Ramp seed for signed step `k`.
    pub fn ramp_seed(&self, k: i32) -> PhaseVector {
        let t = TAU * f64::from(k) / self.ramp_divisor;
        [self.ramp_slope * t, t]
    }

    /// Largest ramp step, as a signed step index.
    fn ramp_depth(&self) -> i32 {
        i32::try_from(self.max_depth).unwrap_or(i32::MAX)
    }
}

/// Anything that can produce the minima set of its potential.
pub trait MinimaProvider {
    /// Locate all distinct minima, in discovery order.
    fn find_minima(&self) -> FluxResult<MinimaSet>;
}

/// The seeded minima search, generic over the local optimizer.
#[derive(Debug, Clone, Default)]
pub struct MinimaSearch<O = Bfgs> {
    optimizer: O,
    config: SearchConfig,
}

impl MinimaSearch<Bfgs> {
    /// Search with the default BFGS optimizer.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_optimizer(Bfgs::default(), config)
    }
}

impl<O> MinimaSearch<O> {
    /// Search with a custom optimizer.
    pub fn with_optimizer(optimizer: O, config: SearchConfig) -> Self {
        Self { optimizer, config }
    }

    /// Search settings.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The local optimizer.
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }
}

impl<O> MinimaSearch<O>
where
    O: Optimizer + Sync,
{
    /// Run the search on `potential`.
    ///
    /// Sequential mode optimizes one ramp step at a time. Parallel mode
    /// optimizes blocks of steps with rayon and accepts them in order, so
    /// both modes return the same set and neither does work proportional to
    /// `max_depth` once the ramp has stopped.
    pub fn run<P>(&self, potential: &P) -> FluxResult<MinimaSet>
    where
        P: PotentialProvider + Sync + ?Sized,
    {
        self.config.validate()?;

        let anchor_seed = self.config.anchor_seed(potential.flux());
        let anchor = self.locate(potential, anchor_seed, SeedOrigin::Anchor)?;
        debug!(minimum = %anchor.minimum, energy = anchor.energy, "anchor minimum");

        let mut minima = MinimaSet::new(self.config.tolerance);
        minima.push_anchor(anchor);

        let depth = self.config.ramp_depth();
        let block = if self.config.parallel {
            i32::try_from(rayon::current_num_threads()).unwrap_or(1).max(1)
        } else {
            1
        };

        let mut start = 1;
        'ramp: while start <= depth {
            let end = depth.min(start.saturating_add(block - 1));
            let pairs: Vec<FluxResult<(MinimumEntry, MinimumEntry)>> = if self.config.parallel {
                (start..=end)
                    .into_par_iter()
                    .map(|k| self.ramp_pair(potential, k))
                    .collect()
            } else {
                (start..=end).map(|k| self.ramp_pair(potential, k)).collect()
            };

            for (k, pair) in (start..=end).zip(pairs) {
                let (plus, minus) = pair?;
                let positive = minima.insert_if_new(plus);
                let negative = minima.insert_if_new(minus);
                debug!(step = k, positive, negative, found = minima.len(), "ramp step");
                if !(positive && negative) {
                    break 'ramp;
                }
            }

            if end == depth {
                break;
            }
            start = end + 1;
        }

        info!(
            flux = potential.flux(),
            minima = minima.len(),
            low_confidence = minima.low_confidence_count(),
            "minima search finished"
        );
        Ok(minima)
    }

    /// Optimize the positive and negative seeds of ramp step `k`.
    fn ramp_pair<P>(&self, potential: &P, k: i32) -> FluxResult<(MinimumEntry, MinimumEntry)>
    where
        P: PotentialProvider + ?Sized,
    {
        let plus = self.locate(potential, self.config.ramp_seed(k), SeedOrigin::Ramp { step: k })?;
        let minus = self.locate(potential, self.config.ramp_seed(-k), SeedOrigin::Ramp { step: -k })?;
        Ok((plus, minus))
    }

    /// Optimize from one seed and apply the convergence policy.
    fn locate<P>(&self, potential: &P, seed: PhaseVector, origin: SeedOrigin) -> FluxResult<MinimumEntry>
    where
        P: PotentialProvider + ?Sized,
    {
        let objective = PotentialObjective(potential);
        let result = self.optimizer.minimize(&objective, &seed)?;
        if result.converged {
            return Ok(entry_from(potential, &result, origin));
        }

        match self.config.convergence {
            ConvergencePolicy::Ignore => Ok(entry_from(potential, &result, origin)),
            ConvergencePolicy::Flag => {
                warn!(%origin, ?seed, iterations = result.num_iterations, "optimizer did not converge");
                Ok(entry_from(potential, &result, origin))
            }
            ConvergencePolicy::Strict => Err(FluxError::DidNotConverge {
                seed,
                iterations: result.num_iterations,
            }),
            ConvergencePolicy::Retry {
                attempts,
                radius,
                seed: rng_seed,
            } => {
                let mut rng = StdRng::seed_from_u64(rng_seed.wrapping_add(origin.ordinal()));
                let mut last = result;
                for attempt in 0..attempts {
                    let perturbed = seed.map(|x| x + rng.gen_range(-radius..=radius));
                    last = self.optimizer.minimize(&objective, &perturbed)?;
                    if last.converged {
                        debug!(%origin, attempt, "retry converged");
                        return Ok(entry_from(potential, &last, origin));
                    }
                }
                warn!(%origin, ?seed, attempts, "optimizer did not converge after retries");
                Ok(entry_from(potential, &last, origin))
            }
        }
    }
}

fn entry_from<P>(potential: &P, result: &OptimizationResult, origin: SeedOrigin) -> MinimumEntry
where
    P: PotentialProvider + ?Sized,
{
    let raw = [result.optimal_params[0], result.optimal_params[1]];
    let minimum = CanonicalMinimum::from_candidate(&raw);
    MinimumEntry {
        minimum,
        raw,
        energy: potential.potential(minimum.phases()),
        origin,
        converged: result.converged,
    }
}
