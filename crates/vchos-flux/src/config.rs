//! Serializable qubit configuration.
//!
//! A config file holds the device parameters, search settings and basis
//! settings; every section and field is optional and falls back to the
//! defaults.
//!
//! ```yaml
//! parameters:
//!   EJ3: 0.8
//!   flux: 0.5
//! search:
//!   max_depth: 3
//!   convergence:
//!     policy: flag
//! basis:
//!   global_exc: 4
//!   squeezing: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{FluxError, FluxResult};
use crate::excitation::{GlobalExcitationCutoff, PerModeCutoff};
use crate::params::{
    DEFAULT_MAXIMUM_PERIODIC_VECTOR_LENGTH, DEFAULT_NUM_EXC, DEFAULT_TRUNCATED_DIM, DeviceParameters,
};
use crate::qubit::FluxQubit;
use crate::search::{MinimaSearch, SearchConfig};

/// Basis truncation and style settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasisSettings {
    /// Bound on the L1 norm of periodic continuation vectors.
    pub maximum_periodic_vector_length: u32,
    /// Per-mode excitation cutoff, used unless `global_exc` is set.
    pub num_exc: u32,
    /// Global excitation cutoff; selects the global truncation when set.
    pub global_exc: Option<u32>,
    /// Use local (squeezed) oscillators at each minimum.
    pub squeezing: bool,
    /// Number of eigenstates kept downstream.
    pub truncated_dim: usize,
}

impl Default for BasisSettings {
    fn default() -> Self {
        Self {
            maximum_periodic_vector_length: DEFAULT_MAXIMUM_PERIODIC_VECTOR_LENGTH,
            num_exc: DEFAULT_NUM_EXC,
            global_exc: None,
            squeezing: false,
            truncated_dim: DEFAULT_TRUNCATED_DIM,
        }
    }
}

impl BasisSettings {
    /// The per-mode truncation described by these settings.
    pub fn per_mode_cutoff(&self) -> PerModeCutoff {
        PerModeCutoff::new(self.num_exc)
    }

    /// The global truncation, if one is configured.
    pub fn global_cutoff(&self) -> Option<GlobalExcitationCutoff> {
        self.global_exc.map(GlobalExcitationCutoff::new)
    }

    /// Name of the qubit variant these settings select.
    pub fn variant_name(&self) -> &'static str {
        match (self.squeezing, self.global_exc.is_some()) {
            (false, false) => "FluxQubitVCHOS",
            (true, false) => "FluxQubitVCHOSSqueezing",
            (false, true) => "FluxQubitVCHOSGlobal",
            (true, true) => "FluxQubitVCHOSGlobalSqueezing",
        }
    }
}

/// Everything needed to build a flux qubit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QubitConfig {
    /// Device parameters.
    pub parameters: DeviceParameters,
    /// Minima search settings.
    pub search: SearchConfig,
    /// Basis settings.
    pub basis: BasisSettings,
}

impl QubitConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(source: &str) -> FluxResult<Self> {
        let config: Self = serde_yaml_ng::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> FluxResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML.
    pub fn to_yaml_string(&self) -> FluxResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the device parameters and search settings.
    pub fn validate(&self) -> FluxResult<()> {
        self.parameters.validate()?;
        self.search.validate()?;
        if self.basis.truncated_dim == 0 {
            return Err(FluxError::Config("basis.truncated_dim must be at least 1".into()));
        }
        Ok(())
    }

    /// Build a qubit with basis `B` and truncation `indexer` from this config.
    pub fn build<B: Default, X>(&self, indexer: X) -> FluxResult<FluxQubit<B, X>> {
        self.validate()?;
        let qubit = FluxQubit::compose(
            self.parameters,
            MinimaSearch::new(self.search.clone()),
            B::default(),
            indexer,
        )?;
        Ok(qubit
            .with_maximum_periodic_vector_length(self.basis.maximum_periodic_vector_length)
            .with_truncated_dim(self.basis.truncated_dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::SqueezedBasis;
    use crate::search::ConvergencePolicy;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = QubitConfig::from_yaml_str(
            "parameters:\n  flux: 0.5\nsearch:\n  convergence:\n    policy: flag\nbasis:\n  global_exc: 3\n",
        )
        .unwrap();
        assert_eq!(config.parameters.flux, 0.5);
        assert_eq!(config.parameters.ej3, 0.8);
        assert_eq!(config.search.convergence, ConvergencePolicy::Flag);
        assert_eq!(config.search.max_depth, 3);
        assert_eq!(config.basis.global_cutoff(), Some(GlobalExcitationCutoff::new(3)));
        assert_eq!(config.basis.variant_name(), "FluxQubitVCHOSGlobal");
    }

    #[test]
    fn test_json_retry_policy() {
        let config = QubitConfig::from_json_str(
            r#"{"search": {"convergence": {"policy": "retry", "attempts": 3, "radius": 0.2, "seed": 7}}}"#,
        )
        .unwrap();
        assert_eq!(
            config.search.convergence,
            ConvergencePolicy::Retry {
                attempts: 3,
                radius: 0.2,
                seed: 7
            }
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let err = QubitConfig::from_yaml_str("parameters:\n  ECJ1: -0.1\n").unwrap_err();
        assert!(matches!(err, FluxError::InvalidParameter { .. }));
        let err = QubitConfig::from_yaml_str("parameters: not-a-table\n").unwrap_err();
        assert!(matches!(err, FluxError::Config(_)));
    }

    #[test]
    fn test_yaml_roundtrip_preserves_config() {
        let mut config = QubitConfig::default();
        config.basis.squeezing = true;
        config.parameters.flux = 0.3;
        let text = config.to_yaml_string().unwrap();
        assert_eq!(QubitConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_build_applies_basis_settings() {
        let mut config = QubitConfig::default();
        config.basis.maximum_periodic_vector_length = 2;
        config.basis.truncated_dim = 10;
        let qubit = config
            .build::<SqueezedBasis, _>(config.basis.per_mode_cutoff())
            .unwrap();
        assert_eq!(qubit.maximum_periodic_vector_length(), 2);
        assert_eq!(qubit.truncated_dim(), 10);
        assert_eq!(qubit.indexer().num_exc, DEFAULT_NUM_EXC);
    }
}
