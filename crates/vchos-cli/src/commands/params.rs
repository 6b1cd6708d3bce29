//! Params command implementation.

use anyhow::{Context, Result};
use console::style;

use vchos_flux::{NONFIT_PARAMS, PARAMETER_NAMES};

use super::common::{load_config, to_json};

/// Execute the params command.
pub fn execute(config: Option<&str>, format: &str) -> Result<()> {
    let config = load_config(config)?;

    match format {
        "json" => println!("{}", to_json(&config)?),
        "yaml" => print!("{}", config.to_yaml_string().context("YAML serialization failed")?),
        _ => {
            println!("{}", style("Device parameters").bold());
            for name in PARAMETER_NAMES {
                let value = config.parameters.get(name)?;
                let note = if NONFIT_PARAMS.contains(&name) {
                    style("(not fitted)").dim().to_string()
                } else {
                    String::new()
                };
                println!("  {name:<6} {value:>10.4}  {note}");
            }
            println!();
            println!("{}", style("Search").bold());
            println!("  max_depth   {}", config.search.max_depth);
            println!("  tolerance   {:e}", config.search.tolerance);
            println!("  parallel    {}", config.search.parallel);
            println!("  convergence {:?}", config.search.convergence);
            println!();
            println!("{}", style("Basis").bold());
            println!("  variant     {}", config.basis.variant_name());
            println!("  num_exc     {}", config.basis.num_exc);
            if let Some(global_exc) = config.basis.global_exc {
                println!("  global_exc  {global_exc}");
            }
            println!("  max |n|₁    {}", config.basis.maximum_periodic_vector_length);
            println!("  truncated   {}", config.basis.truncated_dim);
        }
    }

    Ok(())
}
