//! VCHOS Command-Line Interface
//!
//! Locate flux-qubit potential minima, scan them across flux, and inspect
//! the resulting oscillator basis.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::parse_assignment;
use commands::{basis, minima, params, scan, version};

/// vchos - flux-qubit minima search and VCHOS basis layout
#[derive(Parser)]
#[command(name = "vchos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the distinct minima of the potential
    Minima {
        /// Qubit config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the flux bias
        #[arg(long, allow_hyphen_values = true)]
        flux: Option<f64>,

        /// Override a device parameter (repeatable), e.g. --set EJ3=0.7
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, allow_hyphen_values = true)]
        set: Vec<(String, f64)>,

        /// Optimize all ramp seeds in parallel
        #[arg(long)]
        parallel: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Count minima over a range of flux biases
    Scan {
        /// Qubit config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// First flux bias
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        start: f64,

        /// Last flux bias
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        stop: f64,

        /// Number of flux points
        #[arg(short = 'n', long, default_value = "21")]
        steps: usize,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Summarize the basis layout of the configured qubit variant
    Basis {
        /// Qubit config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the flux bias
        #[arg(long, allow_hyphen_values = true)]
        flux: Option<f64>,

        /// Override a device parameter (repeatable), e.g. --set EJ3=0.7
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, allow_hyphen_values = true)]
        set: Vec<(String, f64)>,

        /// Use a global excitation cutoff instead of the per-mode one
        #[arg(long)]
        global_exc: Option<u32>,

        /// Use local (squeezed) oscillators at each minimum
        #[arg(long)]
        squeezing: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print the effective configuration
    Params {
        /// Qubit config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output format (table, yaml, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Minima {
            config,
            flux,
            set,
            parallel,
            format,
        } => minima::execute(config.as_deref(), flux, &set, parallel, &format),

        Commands::Scan {
            config,
            start,
            stop,
            steps,
            format,
        } => scan::execute(config.as_deref(), start, stop, steps, &format),

        Commands::Basis {
            config,
            flux,
            set,
            global_exc,
            squeezing,
            format,
        } => basis::execute(config.as_deref(), flux, &set, global_exc, squeezing, &format),

        Commands::Params { config, format } => params::execute(config.as_deref(), &format),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_parse_minima_defaults() {
        let cli = parse(&["vchos", "minima"]);
        match cli.command {
            Commands::Minima {
                config,
                flux,
                set,
                parallel,
                format,
            } => {
                assert!(config.is_none());
                assert!(flux.is_none());
                assert!(set.is_empty());
                assert!(!parallel);
                assert_eq!(format, "table");
            }
            _ => panic!("expected minima"),
        }
    }

    #[test]
    fn test_parse_minima_negative_flux() {
        let cli = parse(&["vchos", "minima", "--flux", "-0.5", "--parallel", "-f", "json"]);
        match cli.command {
            Commands::Minima {
                flux, parallel, format, ..
            } => {
                assert_eq!(flux, Some(-0.5));
                assert!(parallel);
                assert_eq!(format, "json");
            }
            _ => panic!("expected minima"),
        }
    }

    #[test]
    fn test_parse_scan_range() {
        let cli = parse(&["vchos", "scan", "--start", "0.4", "--stop", "0.6", "-n", "5"]);
        match cli.command {
            Commands::Scan {
                start, stop, steps, ..
            } => {
                assert_eq!(start, 0.4);
                assert_eq!(stop, 0.6);
                assert_eq!(steps, 5);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_basis_with_config() {
        let cli = parse(&["vchos", "basis", "-c", "qubit.yaml"]);
        assert!(matches!(
            cli.command,
            Commands::Basis { config: Some(ref c), squeezing: false, global_exc: None, .. } if c == "qubit.yaml"
        ));
    }

    #[test]
    fn test_parse_basis_variant_flags() {
        let cli = parse(&["vchos", "basis", "--global-exc", "3", "--squeezing"]);
        assert!(matches!(
            cli.command,
            Commands::Basis { global_exc: Some(3), squeezing: true, .. }
        ));
    }

    #[test]
    fn test_parse_repeated_set() {
        let cli = parse(&["vchos", "minima", "--set", "EJ3=0.7", "--set", "ng1=-0.1"]);
        match cli.command {
            Commands::Minima { set, .. } => {
                assert_eq!(set, vec![("EJ3".to_string(), 0.7), ("ng1".to_string(), -0.1)]);
            }
            _ => panic!("expected minima"),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_set() {
        assert!(Cli::try_parse_from(["vchos", "minima", "--set", "EJ3"]).is_err());
    }

    #[test]
    fn test_parse_verbose_count() {
        let cli = parse(&["vchos", "-vv", "params"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Params { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_flux() {
        assert!(Cli::try_parse_from(["vchos", "minima", "--flux", "half"]).is_err());
    }

    #[test]
    fn test_parse_version() {
        assert!(matches!(parse(&["vchos", "version"]).command, Commands::Version));
    }
}
