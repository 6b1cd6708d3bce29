//! Minima command implementation.
//!
//! Run the seeded search for one flux bias and list the minima found.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use vchos_flux::{FluxPotential, MinimaSearch, MinimaSet};

use super::common::{load_config_with_overrides, print_minima, to_json};

#[derive(Serialize)]
struct MinimaReport<'a> {
    flux: f64,
    global_minimum: Option<usize>,
    minima: &'a MinimaSet,
}

/// Execute the minima command.
pub fn execute(
    config: Option<&str>,
    flux: Option<f64>,
    assignments: &[(String, f64)],
    parallel: bool,
    format: &str,
) -> Result<()> {
    let config = load_config_with_overrides(config, flux, assignments)?;
    let search_config = config.search.clone().with_parallel(parallel || config.search.parallel);
    let potential = FluxPotential::from_params(&config.parameters);

    let minima = MinimaSearch::new(search_config)
        .run(&potential)
        .context("Minima search failed")?;

    match format {
        "json" => {
            let report = MinimaReport {
                flux: config.parameters.flux,
                global_minimum: minima.global_minimum_index(),
                minima: &minima,
            };
            println!("{}", to_json(&report)?);
        }
        _ => {
            println!(
                "{} {} minima at flux {}",
                style("→").cyan().bold(),
                style(minima.len()).bold(),
                style(config.parameters.flux).yellow()
            );
            println!();
            print_minima(&minima);
            if minima.low_confidence_count() > 0 {
                println!();
                println!(
                    "{} {} minima did not converge",
                    style("!").yellow().bold(),
                    minima.low_confidence_count()
                );
            }
        }
    }

    Ok(())
}
