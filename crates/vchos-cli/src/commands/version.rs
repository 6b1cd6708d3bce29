//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - flux-qubit minima search and VCHOS basis layout",
        style("vchos").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  vchos-optim  Local minimizers (BFGS, Nelder-Mead)");
    println!("  vchos-flux   Potential, minima search and basis layout");
    println!("  vchos-cli    Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
