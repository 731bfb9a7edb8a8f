//! Colored CLI output helpers.
//!
//! Errors go to stderr so that stdout stays clean for piping (`blob`, `--json`).

use colored::*;

/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// ```text
///
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// A dimmed `key: value` line, used for record details.
pub fn print_detail(key: &str, value: &str) {
    println!("  {} {}", format!("{key}:").bright_black(), value);
}
