//! Scan command implementation.
//!
//! Run the minima search over a uniform grid of flux biases.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use vchos_flux::{FluxPotential, FluxResult, MinimaSearch, PotentialProvider};

use super::common::{load_config, to_json};

/// Search summary at one flux point.
#[derive(Debug, Clone, Serialize)]
struct ScanPoint {
    flux: f64,
    minima: usize,
    low_confidence: usize,
    global_energy: Option<f64>,
}

/// Uniform grid from `start` to `stop` inclusive.
fn flux_grid(start: f64, stop: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let dx = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + dx * i as f64).collect()
        }
    }
}

/// Execute the scan command.
pub fn execute(config: Option<&str>, start: f64, stop: f64, steps: usize, format: &str) -> Result<()> {
    if !(start.is_finite() && stop.is_finite()) {
        anyhow::bail!("Flux range must be finite, got {start}..{stop}");
    }
    if steps == 0 {
        anyhow::bail!("Scan needs at least one flux point");
    }

    let config = load_config(config)?;
    let search = MinimaSearch::new(config.search.clone());
    let grid = flux_grid(start, stop, steps);

    let progress = ProgressBar::new(grid.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} flux points")?
            .progress_chars("=> "),
    );

    let points: FluxResult<Vec<ScanPoint>> = grid
        .par_iter()
        .map(|&flux| {
            let potential = FluxPotential::from_params(&config.parameters.with_flux(flux));
            let minima = search.run(&potential)?;
            progress.inc(1);
            Ok(ScanPoint {
                flux: potential.flux(),
                minima: minima.len(),
                low_confidence: minima.low_confidence_count(),
                global_energy: minima.global_minimum_index().map(|i| minima[i].energy),
            })
        })
        .collect();
    progress.finish_and_clear();
    let points = points.context("Flux scan failed")?;

    info!(points = points.len(), "flux scan finished");

    match format {
        "json" => println!("{}", to_json(&points)?),
        _ => {
            println!(
                "  {:>10}  {:>6}  {:>14}",
                style("flux").bold(),
                style("minima").bold(),
                style("ground energy").bold()
            );
            for point in &points {
                let energy = point
                    .global_energy
                    .map_or_else(|| "-".to_string(), |e| format!("{e:.6}"));
                let flag = if point.low_confidence > 0 {
                    style("!").yellow().to_string()
                } else {
                    " ".to_string()
                };
                println!("{flag} {:>10.4}  {:>6}  {:>14}", point.flux, point.minima, energy);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_grid_endpoints() {
        let grid = flux_grid(0.0, 1.0, 5);
        assert_eq!(grid, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(flux_grid(0.3, 0.9, 1), vec![0.3]);
        assert!(flux_grid(0.0, 1.0, 0).is_empty());
    }
}
