//! Tests for the composed flux-qubit variants and their basis layouts.

use vchos_flux::{
    BasisStyle, DeviceParameters, ExcitationIndexer, FluxError, FluxQubitVchos, FluxQubitVchosGlobal,
    FluxQubitVchosGlobalSqueezing, FluxQubitVchosSqueezing, GlobalExcitationCutoff, MinimaProvider, NONFIT_PARAMS,
    PerModeCutoff, QubitConfig,
};

fn params() -> DeviceParameters {
    DeviceParameters::default_params()
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

#[test]
fn variant_dimensions_follow_truncation() {
    let mut plain = FluxQubitVchos::vchos(params(), 4).unwrap();
    let mut squeezed = FluxQubitVchosSqueezing::vchos(params(), 4).unwrap();
    let mut global = FluxQubitVchosGlobal::global(params(), 4).unwrap();
    let mut global_squeezed = FluxQubitVchosGlobalSqueezing::global(params(), 4).unwrap();

    let minima = plain.minima().unwrap().len();
    assert_eq!(plain.hilbert_dim().unwrap(), minima * 25);
    assert_eq!(squeezed.hilbert_dim().unwrap(), minima * 25);
    assert_eq!(global.hilbert_dim().unwrap(), minima * 15);
    assert_eq!(global_squeezed.hilbert_dim().unwrap(), minima * 15);
}

#[test]
fn plain_basis_shares_global_minimum_modes() {
    let mut plain = FluxQubitVchos::vchos(params(), 2).unwrap();
    let mut squeezed = FluxQubitVchosSqueezing::vchos(params(), 2).unwrap();

    let plain_layout = plain.basis_layout().unwrap().clone();
    let squeezed_layout = squeezed.basis_layout().unwrap().clone();
    assert_eq!(plain_layout.style, Some(BasisStyle::Plain));
    assert_eq!(squeezed_layout.style, Some(BasisStyle::Squeezed));
    assert_eq!(plain_layout.minima, squeezed_layout.minima);

    let global = plain.minima().unwrap().global_minimum_index().unwrap();
    for modes in &plain_layout.modes {
        assert_eq!(*modes, squeezed_layout.modes[global]);
    }
    // The wells at f = 0.46 are inequivalent, so their curvatures differ.
    assert!(squeezed_layout.modes.len() >= 2);
    assert_ne!(squeezed_layout.modes[0], squeezed_layout.modes[1]);
}

#[test]
fn normal_mode_frequencies_positive() {
    let mut qubit = FluxQubitVchosSqueezing::vchos(params(), 1).unwrap();
    let layout = qubit.basis_layout().unwrap();
    for modes in &layout.modes {
        assert!(modes.frequencies.iter().all(|w| *w > 0.0));
        assert!(modes.frequencies[0] <= modes.frequencies[1]);
    }
}

#[test]
fn layout_states_cover_every_minimum() {
    let mut qubit = FluxQubitVchosGlobal::global(params(), 1).unwrap();
    let layout = qubit.basis_layout().unwrap();
    assert_eq!(layout.truncation, "global");
    assert_eq!(layout.periodic_vectors.len(), 5);
    for (i, state) in layout.states().enumerate() {
        assert!(state.minimum_index < layout.minima.len());
        assert_eq!(layout.index_of(&state), Some(i));
    }
}

// ---------------------------------------------------------------------------
// Change tracking
// ---------------------------------------------------------------------------

#[test]
fn flux_change_invalidates_minima() {
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    let before = qubit.minima().unwrap().len();
    qubit.set_param("flux", 0.0).unwrap();
    let after = qubit.minima().unwrap().len();
    assert_eq!(before, 2);
    assert_eq!(after, 1);
}

#[test]
fn nonfit_names_are_settings_not_device_parameters() {
    assert_eq!(
        NONFIT_PARAMS,
        ["alpha", "nglist", "maximum_periodic_vector_length", "num_exc", "squeezing", "truncated_dim"]
    );
    assert!(!NONFIT_PARAMS.contains(&"flux"));
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    for name in ["nglist", "num_exc", "squeezing", "truncated_dim"] {
        assert!(matches!(qubit.set_param(name, 1.0), Err(FluxError::UnknownParameter(_))));
    }
}

#[test]
fn cached_minima_match_fresh_search() {
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    let cached = qubit.minima().unwrap().clone();
    assert_eq!(cached, qubit.find_minima().unwrap());
}

#[test]
fn periodic_vector_bound_change_rebuilds_layout() {
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    assert_eq!(qubit.basis_layout().unwrap().periodic_vectors.len(), 5);
    qubit.set_maximum_periodic_vector_length(2);
    assert_eq!(qubit.basis_layout().unwrap().periodic_vectors.len(), 13);
}

#[test]
fn unknown_parameter_rejected() {
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    let err = qubit.set_param("EJ4", 1.0).unwrap_err();
    assert!(matches!(err, FluxError::UnknownParameter(name) if name == "EJ4"));
}

#[test]
fn replacing_params_revalidates() {
    let mut qubit = FluxQubitVchos::vchos(params(), 1).unwrap();
    let bad = DeviceParameters {
        flux: f64::INFINITY,
        ..params()
    };
    assert!(qubit.set_params(bad).is_err());
    assert_eq!(qubit.params().flux, params().flux);
}

// ---------------------------------------------------------------------------
// Config-driven construction
// ---------------------------------------------------------------------------

#[test]
fn config_builds_global_squeezed_variant() {
    let config = QubitConfig::from_yaml_str("basis:\n  global_exc: 2\n  squeezing: true\n").unwrap();
    assert_eq!(config.basis.variant_name(), "FluxQubitVCHOSGlobalSqueezing");
    let cutoff = config.basis.global_cutoff().unwrap();
    assert_eq!(cutoff.len(), 6);
    let mut qubit = config
        .build::<vchos_flux::SqueezedBasis, GlobalExcitationCutoff>(cutoff)
        .unwrap();
    let minima = qubit.minima().unwrap().len();
    assert_eq!(qubit.hilbert_dim().unwrap(), minima * 6);
}

#[test]
fn per_mode_cutoff_matches_config() {
    let config = QubitConfig::default();
    assert_eq!(config.basis.per_mode_cutoff(), PerModeCutoff::new(4));
    assert_eq!(config.basis.variant_name(), "FluxQubitVCHOS");
}
