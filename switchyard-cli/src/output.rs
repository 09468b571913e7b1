//! Console output helpers.

use colored::Colorize;

/// Prints an action result line, e.g. `OK` or `DISABLED`.
pub fn print_ok(msg: &str) {
    println!("{}", msg.green());
}

/// Prints an informational line.
pub fn print_info(msg: &str) {
    println!("{msg}");
}

/// Prints a non-fatal warning line.
pub fn print_warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}
