//! The flux-qubit model: device parameters composed with a minima search,
//! a basis builder and an excitation truncation.
//!
//! The four VCHOS variants differ only in the capabilities plugged in:
//!
//! | alias                           | basis            | truncation                 |
//! |---------------------------------|------------------|----------------------------|
//! | [`FluxQubitVchos`]              | [`PlainBasis`]    | [`PerModeCutoff`]          |
//! | [`FluxQubitVchosSqueezing`]     | [`SqueezedBasis`] | [`PerModeCutoff`]          |
//! | [`FluxQubitVchosGlobal`]        | [`PlainBasis`]    | [`GlobalExcitationCutoff`] |
//! | [`FluxQubitVchosGlobalSqueezing`] | [`SqueezedBasis`] | [`GlobalExcitationCutoff`] |
//!
//! # Example
//!
//! ```rust
//! use vchos_flux::{DeviceParameters, FluxQubitVchos, MinimaProvider};
//!
//! let mut qubit = FluxQubitVchos::vchos(DeviceParameters::default_params(), 4).unwrap();
//! let minima = qubit.find_minima().unwrap();
//! assert!(minima.len() >= 2);
//!
//! qubit.set_param("flux", 0.5).unwrap();
//! let layout = qubit.basis_layout().unwrap();
//! assert_eq!(layout.dimension(), layout.minima.len() * 25);
//! ```

use tracing::trace;

use vchos_optim::{Bfgs, Optimizer};

use crate::basis::{BasisBuilder, BasisLayout, PlainBasis, SqueezedBasis};
use crate::error::FluxResult;
use crate::excitation::{ExcitationIndexer, GlobalExcitationCutoff, PerModeCutoff};
use crate::minima::MinimaSet;
use crate::params::{
    DEFAULT_MAXIMUM_PERIODIC_VECTOR_LENGTH, DEFAULT_TRUNCATED_DIM, DeviceParameters, GenerationCache,
    ObservedParameters,
};
use crate::potential::FluxPotential;
use crate::search::{MinimaProvider, MinimaSearch, SearchConfig};

/// Plain VCHOS with a per-mode excitation cutoff.
pub type FluxQubitVchos = FluxQubit<PlainBasis, PerModeCutoff>;
/// Squeezed VCHOS with a per-mode excitation cutoff.
pub type FluxQubitVchosSqueezing = FluxQubit<SqueezedBasis, PerModeCutoff>;
/// Plain VCHOS with a global excitation cutoff.
pub type FluxQubitVchosGlobal = FluxQubit<PlainBasis, GlobalExcitationCutoff>;
/// Squeezed VCHOS with a global excitation cutoff.
pub type FluxQubitVchosGlobalSqueezing = FluxQubit<SqueezedBasis, GlobalExcitationCutoff>;

/// A three-junction flux qubit modelled in a VCHOS basis.
#[derive(Debug, Clone)]
pub struct FluxQubit<B, X, O = Bfgs> {
    params: ObservedParameters,
    search: MinimaSearch<O>,
    basis: B,
    indexer: X,
    maximum_periodic_vector_length: u32,
    truncated_dim: usize,
    minima_cache: GenerationCache<MinimaSet>,
    layout_cache: GenerationCache<BasisLayout>,
}

impl<B: Default, X> FluxQubit<B, X, Bfgs> {
    /// Qubit with the default search settings and optimizer.
    pub fn with_indexer(params: DeviceParameters, indexer: X) -> FluxResult<Self> {
        Self::compose(params, MinimaSearch::new(SearchConfig::default()), B::default(), indexer)
    }
}

impl<B: Default> FluxQubit<B, PerModeCutoff, Bfgs> {
    /// Qubit keeping `0..=num_exc` excitations in each mode.
    pub fn vchos(params: DeviceParameters, num_exc: u32) -> FluxResult<Self> {
        Self::with_indexer(params, PerModeCutoff::new(num_exc))
    }
}

impl<B: Default> FluxQubit<B, GlobalExcitationCutoff, Bfgs> {
    /// Qubit keeping excitation tuples with total at most `global_exc`.
    pub fn global(params: DeviceParameters, global_exc: u32) -> FluxResult<Self> {
        Self::with_indexer(params, GlobalExcitationCutoff::new(global_exc))
    }
}

impl<B, X, O> FluxQubit<B, X, O> {
    /// Assemble a qubit from explicit capabilities.
    pub fn compose(params: DeviceParameters, search: MinimaSearch<O>, basis: B, indexer: X) -> FluxResult<Self> {
        Ok(Self {
            params: ObservedParameters::new(params)?,
            search,
            basis,
            indexer,
            maximum_periodic_vector_length: DEFAULT_MAXIMUM_PERIODIC_VECTOR_LENGTH,
            truncated_dim: DEFAULT_TRUNCATED_DIM,
            minima_cache: GenerationCache::new(),
            layout_cache: GenerationCache::new(),
        })
    }

    /// Set the bound on periodic continuation vectors.
    #[must_use]
    pub fn with_maximum_periodic_vector_length(mut self, length: u32) -> Self {
        self.maximum_periodic_vector_length = length;
        self.params.touch();
        self
    }

    /// Set the number of eigenstates kept downstream.
    #[must_use]
    pub fn with_truncated_dim(mut self, truncated_dim: usize) -> Self {
        self.truncated_dim = truncated_dim;
        self
    }

    /// Current device parameters.
    pub fn params(&self) -> &DeviceParameters {
        self.params.params()
    }

    /// Generation of the parameters; bumps on every observed change.
    pub fn generation(&self) -> u64 {
        self.params.generation()
    }

    /// Set one device parameter by name.
    pub fn set_param(&mut self, name: &str, value: f64) -> FluxResult<()> {
        self.params.set(name, value)
    }

    /// Replace all device parameters.
    pub fn set_params(&mut self, params: DeviceParameters) -> FluxResult<()> {
        self.params.replace(params)
    }

    /// Swap the excitation truncation.
    pub fn set_indexer(&mut self, indexer: X) {
        self.indexer = indexer;
        self.params.touch();
    }

    /// Change the bound on periodic continuation vectors.
    pub fn set_maximum_periodic_vector_length(&mut self, length: u32) {
        self.maximum_periodic_vector_length = length;
        self.params.touch();
    }

    /// The excitation truncation in use.
    pub fn indexer(&self) -> &X {
        &self.indexer
    }

    /// The basis builder in use.
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// Bound on periodic continuation vectors.
    pub fn maximum_periodic_vector_length(&self) -> u32 {
        self.maximum_periodic_vector_length
    }

    /// Number of eigenstates kept downstream.
    pub fn truncated_dim(&self) -> usize {
        self.truncated_dim
    }

    /// Search settings.
    pub fn search_config(&self) -> &SearchConfig {
        self.search.config()
    }

    /// The potential for the current parameters.
    pub fn potential(&self) -> FluxPotential {
        FluxPotential::from_params(self.params.params())
    }
}

impl<B, X, O> MinimaProvider for FluxQubit<B, X, O>
where
    O: Optimizer + Sync,
{
    fn find_minima(&self) -> FluxResult<MinimaSet> {
        self.search.run(&self.potential())
    }
}

impl<B, X, O> FluxQubit<B, X, O>
where
    B: BasisBuilder,
    X: ExcitationIndexer,
    O: Optimizer + Sync,
{
    /// Minima for the current parameters, recomputed only after a change.
    pub fn minima(&mut self) -> FluxResult<&MinimaSet> {
        let generation = self.params.generation();
        if !self.minima_cache.is_current(generation) {
            trace!(generation, "minima cache stale");
            let minima = self.find_minima()?;
            return Ok(self.minima_cache.store(generation, minima));
        }
        Ok(self.minima_cache.value())
    }

    /// Basis layout for the current parameters, recomputed only after a change.
    pub fn basis_layout(&mut self) -> FluxResult<&BasisLayout> {
        let generation = self.params.generation();
        if !self.layout_cache.is_current(generation) {
            trace!(generation, "basis layout cache stale");
            let minima = self.minima()?.clone();
            let ec = self.params.params().ec_matrix()?;
            let layout = BasisLayout::build(
                &self.potential(),
                &ec,
                &minima,
                &self.basis,
                &self.indexer,
                self.maximum_periodic_vector_length,
            )?;
            return Ok(self.layout_cache.store(generation, layout));
        }
        Ok(self.layout_cache.value())
    }

    /// Dimension of the variational Hilbert space.
    pub fn hilbert_dim(&mut self) -> FluxResult<usize> {
        Ok(self.basis_layout()?.dimension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minima_cached_until_change() {
        let mut qubit = FluxQubitVchos::vchos(DeviceParameters::default_params(), 2).unwrap();
        let first = qubit.minima().unwrap().clone();
        let generation = qubit.generation();
        assert_eq!(qubit.minima().unwrap(), &first);
        assert_eq!(qubit.generation(), generation);

        qubit.set_param("flux", 0.0).unwrap();
        assert!(qubit.generation() > generation);
        let after = qubit.minima().unwrap();
        assert_ne!(after, &first);
    }

    #[test]
    fn test_settings_readable_without_optimizer_bound() {
        let search = MinimaSearch::with_optimizer((), SearchConfig::default().with_max_depth(5));
        let qubit: FluxQubit<PlainBasis, PerModeCutoff, ()> = FluxQubit::compose(
            DeviceParameters::default_params(),
            search,
            PlainBasis,
            PerModeCutoff::new(1),
        )
        .unwrap();
        assert_eq!(qubit.search_config().max_depth, 5);
    }

    #[test]
    fn test_failed_set_keeps_cache() {
        let mut qubit = FluxQubitVchos::vchos(DeviceParameters::default_params(), 2).unwrap();
        qubit.minima().unwrap();
        let generation = qubit.generation();
        assert!(qubit.set_param("ECJ1", -1.0).is_err());
        assert_eq!(qubit.generation(), generation);
    }

    #[test]
    fn test_indexer_change_invalidates_layout() {
        let mut qubit = FluxQubitVchosGlobal::global(DeviceParameters::default_params(), 2).unwrap();
        let before = qubit.hilbert_dim().unwrap();
        qubit.set_indexer(GlobalExcitationCutoff::new(3));
        let after = qubit.hilbert_dim().unwrap();
        let minima = qubit.minima().unwrap().len();
        assert_eq!(before, minima * 6);
        assert_eq!(after, minima * 10);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = DeviceParameters {
            ecg1: 0.0,
            ..DeviceParameters::default_params()
        };
        assert!(FluxQubitVchos::vchos(params, 2).is_err());
    }
}
