//! Basis command implementation.
//!
//! Build the qubit variant selected by the config and summarize its basis.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use vchos_flux::{
    BasisBuilder, BasisLayout, ExcitationIndexer, FluxQubit, PlainBasis, QubitConfig, SqueezedBasis,
};

use super::common::{load_config_with_overrides, to_json};

#[derive(Serialize)]
struct BasisSummary {
    variant: &'static str,
    flux: f64,
    dimension: usize,
    truncated_dim: usize,
    layout: BasisLayout,
}

fn summarize<B, X>(config: &QubitConfig, indexer: X) -> Result<BasisSummary>
where
    B: BasisBuilder + Default,
    X: ExcitationIndexer,
{
    let mut qubit: FluxQubit<B, X> = config.build(indexer).context("Failed to build qubit")?;
    let layout = qubit
        .basis_layout()
        .context("Failed to build basis layout")?
        .clone();
    Ok(BasisSummary {
        variant: config.basis.variant_name(),
        flux: config.parameters.flux,
        dimension: layout.dimension(),
        truncated_dim: qubit.truncated_dim(),
        layout,
    })
}

/// Execute the basis command.
pub fn execute(
    config: Option<&str>,
    flux: Option<f64>,
    assignments: &[(String, f64)],
    global_exc: Option<u32>,
    squeezing: bool,
    format: &str,
) -> Result<()> {
    let mut config = load_config_with_overrides(config, flux, assignments)?;
    if global_exc.is_some() {
        config.basis.global_exc = global_exc;
    }
    config.basis.squeezing |= squeezing;

    let summary = match (config.basis.squeezing, config.basis.global_cutoff()) {
        (false, None) => summarize::<PlainBasis, _>(&config, config.basis.per_mode_cutoff())?,
        (true, None) => summarize::<SqueezedBasis, _>(&config, config.basis.per_mode_cutoff())?,
        (false, Some(cutoff)) => summarize::<PlainBasis, _>(&config, cutoff)?,
        (true, Some(cutoff)) => summarize::<SqueezedBasis, _>(&config, cutoff)?,
    };

    match format {
        "json" => println!("{}", to_json(&summary)?),
        _ => print_summary(&summary),
    }

    Ok(())
}

fn print_summary(summary: &BasisSummary) {
    let layout = &summary.layout;
    println!(
        "{} {} at flux {}",
        style("→").cyan().bold(),
        style(summary.variant).bold(),
        style(summary.flux).yellow()
    );
    println!();
    println!("  Minima:            {}", layout.minima.len());
    println!(
        "  Excitations:       {} per minimum ({})",
        layout.excitations.len(),
        layout.truncation
    );
    println!("  Periodic vectors:  {}", layout.periodic_vectors.len());
    println!("  Hilbert dimension: {}", style(summary.dimension).bold());
    println!("  Truncated dim:     {}", summary.truncated_dim);
    println!();
    println!(
        "  {:>3}  {:>12}  {:>12}  {:>12}  {:>12}",
        style("#").bold(),
        style("φ₁").bold(),
        style("φ₂").bold(),
        style("ω₀").bold(),
        style("ω₁").bold()
    );
    for (i, (phi, modes)) in layout.minima.iter().zip(&layout.modes).enumerate() {
        println!(
            "  {:>3}  {:>12.6}  {:>12.6}  {:>12.6}  {:>12.6}",
            i, phi[0], phi[1], modes.frequencies[0], modes.frequencies[1]
        );
    }
}
