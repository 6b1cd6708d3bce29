//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use vchos_flux::{MinimaSet, QubitConfig};

/// Load a qubit config from a YAML or JSON file, or the defaults if no path is given.
pub fn load_config(path: Option<&str>) -> Result<QubitConfig> {
    let Some(path) = path else {
        return Ok(QubitConfig::default());
    };
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source = fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    let config = match ext.to_lowercase().as_str() {
        "json" => QubitConfig::from_json_str(&source),
        _ => QubitConfig::from_yaml_str(&source),
    };
    config.with_context(|| format!("Invalid config: {path}"))
}

/// Load a config and apply `--set NAME=VALUE` assignments and a flux override.
pub fn load_config_with_overrides(
    path: Option<&str>,
    flux: Option<f64>,
    assignments: &[(String, f64)],
) -> Result<QubitConfig> {
    let mut config = load_config(path)?;
    for (name, value) in assignments {
        config
            .parameters
            .set(name, *value)
            .with_context(|| format!("Invalid override: {name}={value}"))?;
    }
    if let Some(flux) = flux {
        config
            .parameters
            .set("flux", flux)
            .with_context(|| format!("Invalid flux override: {flux}"))?;
    }
    Ok(config)
}

/// Parse a `NAME=VALUE` parameter assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

/// Render a JSON value for stdout.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

/// Print minima as a table.
pub fn print_minima(minima: &MinimaSet) {
    println!(
        "  {:>3}  {:<24}  {:>12}  {:<10}",
        style("#").bold(),
        style("minimum (φ₁, φ₂)").bold(),
        style("energy").bold(),
        style("seed").bold()
    );
    let global = minima.global_minimum_index();
    for (i, entry) in minima.iter().enumerate() {
        let marker = if Some(i) == global { "*" } else { " " };
        let confidence = if entry.is_low_confidence() {
            style("low confidence").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{marker} {:>3}  {:<24}  {:>12.6}  {:<10}  {confidence}",
            i,
            entry.minimum.to_string(),
            entry.energy,
            entry.origin.to_string()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("EJ3=0.7").unwrap(), ("EJ3".to_string(), 0.7));
        assert_eq!(parse_assignment(" ng1 = -0.25 ").unwrap(), ("ng1".to_string(), -0.25));
        assert!(parse_assignment("EJ3").is_err());
        assert!(parse_assignment("EJ3=big").is_err());
    }

    #[test]
    fn test_overrides_applied_in_order() {
        let sets = vec![("EJ3".to_string(), 0.7), ("flux".to_string(), 0.2)];
        let config = load_config_with_overrides(None, Some(0.3), &sets).unwrap();
        assert_eq!(config.parameters.ej3, 0.7);
        assert_eq!(config.parameters.flux, 0.3);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let sets = vec![("EJ9".to_string(), 1.0)];
        let err = load_config_with_overrides(None, None, &sets).unwrap_err();
        assert!(format!("{err:#}").contains("EJ9"));
    }
}
