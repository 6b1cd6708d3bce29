//! Three-junction flux qubit in a variational tight-binding (VCHOS) basis.
//!
//! This crate locates the distinct minima of the flux-qubit Josephson
//! potential and lays out the basis of localized harmonic-oscillator states
//! built around them:
//!
//! - **[`potential`]**: the potential, its gradient and Hessian
//! - **[`normalize`]** / **[`dedup`]**: folding into (−π, π]² and
//!   lattice-aware duplicate detection
//! - **[`search`]**: the seeded anchor-plus-ramp minima search
//! - **[`basis`]** / **[`excitation`]**: normal modes, truncation schemes and
//!   the resulting basis layout
//! - **[`qubit`]**: the composed model with cached derived state
//!
//! # Example
//!
//! ```rust
//! use vchos_flux::{FluxPotential, MinimaSearch, SearchConfig};
//!
//! let potential = FluxPotential::new([1.0, 1.0, 0.8], 0.46);
//! let minima = MinimaSearch::new(SearchConfig::default()).run(&potential).unwrap();
//!
//! assert!(minima.len() >= 2);
//! for entry in &minima {
//!     println!("{} from {}: U = {:.4}", entry.minimum, entry.origin, entry.energy);
//! }
//! ```

pub mod basis;
pub mod config;
pub mod dedup;
pub mod error;
pub mod excitation;
pub mod minima;
pub mod normalize;
pub mod params;
pub mod potential;
pub mod qubit;
pub mod search;

pub use basis::{BasisBuilder, BasisLayout, BasisState, BasisStyle, NormalModes, PlainBasis, SqueezedBasis, periodic_vectors};
pub use config::{BasisSettings, QubitConfig};
pub use dedup::{coincide_mod_lattice, is_new, periodic_distance};
pub use error::{FluxError, FluxResult};
pub use excitation::{ExcitationIndexer, ExcitationTuple, GlobalExcitationCutoff, PerModeCutoff};
pub use minima::{CanonicalMinimum, MinimaSet, MinimumEntry, SeedOrigin};
pub use normalize::{normalize, wrap_phase};
pub use params::{DeviceParameters, GenerationCache, NONFIT_PARAMS, ObservedParameters, PARAMETER_NAMES};
pub use potential::{
    BOUNDARY_COEFFICIENTS, FluxPotential, Matrix2, NUM_DEGREES_OF_FREEDOM, PhaseVector, PotentialObjective,
    PotentialProvider,
};
pub use qubit::{
    FluxQubit, FluxQubitVchos, FluxQubitVchosGlobal, FluxQubitVchosGlobalSqueezing, FluxQubitVchosSqueezing,
};
pub use search::{ConvergencePolicy, MinimaProvider, MinimaSearch, SearchConfig};
