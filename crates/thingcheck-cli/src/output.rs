//! Output formatting utilities.

use serde::Serialize;
use thingcheck_core::Param;

/// Formats a value as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prints the header of a verified parameter table.
#[allow(clippy::print_literal)]
pub fn print_param_header() {
    println!("{:<24} {:<20} {}", "IDENTIFIER", "NAME", "VALUE");
    println!("{}", "-".repeat(72));
}

/// Formats a verified parameter as a table row.
pub fn format_param_row(param: &Param) -> String {
    format!(
        "{:<24} {:<20} {}",
        truncate(&param.identifier, 24),
        truncate(&param.name, 20),
        param.value.to_json()
    )
}

/// Prints the header of a definition table.
#[allow(clippy::print_literal)]
pub fn print_definition_header() {
    println!(
        "{:<8} {:<24} {:<10} {:<8} {}",
        "KIND", "IDENTIFIER", "TYPE", "MODE", "NAME"
    );
    println!("{}", "-".repeat(80));
}

/// Formats one definition as a table row.
pub fn format_definition_row(kind: &str, identifier: &str, data_type: &str, mode: &str, name: &str) -> String {
    format!(
        "{:<8} {:<24} {:<10} {:<8} {}",
        kind,
        truncate(identifier, 24),
        data_type,
        mode,
        name
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
