//! Device parameters, the default parameter table, and change tracking.
//!
//! Energies are in arbitrary but consistent units (GHz in practice); the
//! flux bias is in units of the flux quantum and is periodic with period 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{FluxError, FluxResult};

/// Names of the flat parameter mapping, in canonical order.
pub const PARAMETER_NAMES: [&str; 11] = [
    "EJ1", "EJ2", "EJ3", "ECJ1", "ECJ2", "ECJ3", "ECg1", "ECg2", "ng1", "ng2", "flux",
];

/// Parameters excluded from external fitting workflows.
pub const NONFIT_PARAMS: [&str; 6] = [
    "alpha",
    "nglist",
    "maximum_periodic_vector_length",
    "num_exc",
    "squeezing",
    "truncated_dim",
];

/// Default junction charging energy.
pub const DEFAULT_ECJ: f64 = 0.1;
/// Default gate charging energy.
pub const DEFAULT_ECG: f64 = 5.0;
/// Default Josephson energies `[EJ1, EJ2, EJ3]`.
pub const DEFAULT_EJ: [f64; 3] = [1.0, 1.0, 0.8];
/// Default ratio of the small junction to the large ones.
pub const DEFAULT_ALPHA: f64 = 0.8;
/// Default flux bias; inside the double-well regime.
pub const DEFAULT_FLUX: f64 = 0.46;
/// Default bound on periodic continuation vectors.
pub const DEFAULT_MAXIMUM_PERIODIC_VECTOR_LENGTH: u32 = 1;
/// Default per-mode excitation cutoff.
pub const DEFAULT_NUM_EXC: u32 = 4;
/// Default number of eigenstates kept downstream.
pub const DEFAULT_TRUNCATED_DIM: usize = 6;

/// Josephson energies, charging energies, offset charges and flux bias of a
/// three-junction flux qubit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceParameters {
    /// Josephson energy of junction 1.
    #[serde(rename = "EJ1")]
    pub ej1: f64,
    /// Josephson energy of junction 2.
    #[serde(rename = "EJ2")]
    pub ej2: f64,
    /// Josephson energy of junction 3 (the small junction).
    #[serde(rename = "EJ3")]
    pub ej3: f64,
    /// Charging energy of junction 1.
    #[serde(rename = "ECJ1")]
    pub ecj1: f64,
    /// Charging energy of junction 2.
    #[serde(rename = "ECJ2")]
    pub ecj2: f64,
    /// Charging energy of junction 3.
    #[serde(rename = "ECJ3")]
    pub ecj3: f64,
    /// Charging energy of gate capacitor 1.
    #[serde(rename = "ECg1")]
    pub ecg1: f64,
    /// Charging energy of gate capacitor 2.
    #[serde(rename = "ECg2")]
    pub ecg2: f64,
    /// Offset charge on island 1.
    pub ng1: f64,
    /// Offset charge on island 2.
    pub ng2: f64,
    /// External flux bias in units of the flux quantum.
    pub flux: f64,
}

impl Default for DeviceParameters {
    fn default() -> Self {
        Self::default_params()
    }
}

impl DeviceParameters {
    /// The default parameter table.
    pub fn default_params() -> Self {
        Self {
            ej1: DEFAULT_EJ[0],
            ej2: DEFAULT_EJ[1],
            ej3: DEFAULT_EJ[2],
            ecj1: DEFAULT_ECJ,
            ecj2: DEFAULT_ECJ,
            ecj3: DEFAULT_ECJ,
            ecg1: DEFAULT_ECG,
            ecg2: DEFAULT_ECG,
            ng1: 0.0,
            ng2: 0.0,
            flux: DEFAULT_FLUX,
        }
    }

    /// Same parameters at a different flux bias.
    #[must_use]
    pub fn with_flux(mut self, flux: f64) -> Self {
        self.flux = flux;
        self
    }

    /// Ratio `EJ3 / EJ1` of the small junction to the first large one.
    pub fn alpha(&self) -> f64 {
        self.ej3 / self.ej1
    }

    /// Josephson energies as an array.
    pub fn ej_list(&self) -> [f64; 3] {
        [self.ej1, self.ej2, self.ej3]
    }

    /// Offset charges as an array.
    pub fn ng_list(&self) -> [f64; 2] {
        [self.ng1, self.ng2]
    }

    /// Flat name → value mapping.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        PARAMETER_NAMES
            .iter()
            .map(|&name| (name, self.field(name).unwrap_or(f64::NAN)))
            .collect()
    }

    /// Build from a flat mapping; names not present keep their default.
    pub fn from_map<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> FluxResult<Self> {
        let mut params = Self::default_params();
        for (name, value) in entries {
            *params.field_mut(name)? = value;
        }
        params.validate()?;
        Ok(params)
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> FluxResult<f64> {
        self.field(name)
            .ok_or_else(|| FluxError::UnknownParameter(name.to_string()))
    }

    /// Set a parameter by name. The parameters are left untouched if the
    /// new value fails validation.
    pub fn set(&mut self, name: &str, value: f64) -> FluxResult<()> {
        let mut next = *self;
        *next.field_mut(name)? = value;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check every value is finite, charging energies are positive and
    /// Josephson energies are non-negative.
    pub fn validate(&self) -> FluxResult<()> {
        for (name, value) in self.to_map() {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }
        for (name, value) in [("EJ1", self.ej1), ("EJ2", self.ej2), ("EJ3", self.ej3)] {
            if value < 0.0 {
                return Err(invalid(name, value, "Josephson energies must be non-negative"));
            }
        }
        for (name, value) in [
            ("ECJ1", self.ecj1),
            ("ECJ2", self.ecj2),
            ("ECJ3", self.ecj3),
            ("ECg1", self.ecg1),
            ("ECg2", self.ecg2),
        ] {
            if value <= 0.0 {
                return Err(invalid(name, value, "charging energies must be positive"));
            }
        }
        Ok(())
    }

    /// Capacitance matrix in units where `C = 1 / (2 EC)`.
    pub fn capacitance_matrix(&self) -> [[f64; 2]; 2] {
        let c = |ec: f64| 1.0 / (2.0 * ec);
        let (cj1, cj2, cj3) = (c(self.ecj1), c(self.ecj2), c(self.ecj3));
        let (cg1, cg2) = (c(self.ecg1), c(self.ecg2));
        [[cj1 + cj3 + cg1, -cj3], [-cj3, cj2 + cj3 + cg2]]
    }

    /// Charging-energy matrix `EC = C⁻¹ / 2`.
    pub fn ec_matrix(&self) -> FluxResult<[[f64; 2]; 2]> {
        let [[a, b], [c, d]] = self.capacitance_matrix();
        let determinant = a * d - b * c;
        if !determinant.is_finite() || determinant <= 0.0 {
            return Err(FluxError::SingularCapacitance { determinant });
        }
        let scale = 0.5 / determinant;
        Ok([[d * scale, -b * scale], [-c * scale, a * scale]])
    }

    fn field(&self, name: &str) -> Option<f64> {
        let value = match name {
            "EJ1" => self.ej1,
            "EJ2" => self.ej2,
            "EJ3" => self.ej3,
            "ECJ1" => self.ecj1,
            "ECJ2" => self.ecj2,
            "ECJ3" => self.ecj3,
            "ECg1" => self.ecg1,
            "ECg2" => self.ecg2,
            "ng1" => self.ng1,
            "ng2" => self.ng2,
            "flux" => self.flux,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, name: &str) -> FluxResult<&mut f64> {
        let slot = match name {
            "EJ1" => &mut self.ej1,
            "EJ2" => &mut self.ej2,
            "EJ3" => &mut self.ej3,
            "ECJ1" => &mut self.ecj1,
            "ECJ2" => &mut self.ecj2,
            "ECJ3" => &mut self.ecj3,
            "ECg1" => &mut self.ecg1,
            "ECg2" => &mut self.ecg2,
            "ng1" => &mut self.ng1,
            "ng2" => &mut self.ng2,
            "flux" => &mut self.flux,
            other => return Err(FluxError::UnknownParameter(other.to_string())),
        };
        Ok(slot)
    }
}

fn invalid(name: &str, value: f64, reason: &'static str) -> FluxError {
    FluxError::InvalidParameter {
        name: name.to_string(),
        value,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Change tracking
// ---------------------------------------------------------------------------

/// Device parameters plus a generation counter bumped on every change.
///
/// Derived state (minima, basis layouts) records the generation it was
/// computed for and is recomputed when the counter has moved on.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedParameters {
    params: DeviceParameters,
    generation: u64,
}

impl ObservedParameters {
    /// Start tracking a validated parameter set at generation 0.
    pub fn new(params: DeviceParameters) -> FluxResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            generation: 0,
        })
    }

    /// Current parameters.
    pub fn params(&self) -> &DeviceParameters {
        &self.params
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set one parameter by name; bumps the generation on success.
    pub fn set(&mut self, name: &str, value: f64) -> FluxResult<()> {
        self.params.set(name, value)?;
        self.touch();
        Ok(())
    }

    /// Replace the whole parameter set; bumps the generation on success.
    pub fn replace(&mut self, params: DeviceParameters) -> FluxResult<()> {
        params.validate()?;
        self.params = params;
        self.touch();
        Ok(())
    }

    /// Mark derived state stale without changing any value.
    pub fn touch(&mut self) {
        self.generation += 1;
        trace!(generation = self.generation, "device parameters changed");
    }
}

/// A derived value tagged with the parameter generation it was built for.
#[derive(Debug, Clone, Default)]
pub struct GenerationCache<T> {
    generation: Option<u64>,
    value: T,
}

impl<T: Default> GenerationCache<T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self {
            generation: None,
            value: T::default(),
        }
    }

    /// True if the cached value was computed for `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == Some(generation)
    }

    /// Store a freshly computed value.
    pub fn store(&mut self, generation: u64, value: T) -> &T {
        self.generation = Some(generation);
        self.value = value;
        &self.value
    }

    /// The cached value, current or not.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Drop the cached value.
    pub fn invalidate(&mut self) {
        self.generation = None;
        self.value = T::default();
    }
}
