//! Terminal output helpers

use colored::Colorize;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn success(message: impl AsRef<str>) {
    println!("{}", format!("✓ {}", message.as_ref()).green().bold());
}

pub fn progress(message: impl AsRef<str>) {
    println!("{}", message.as_ref().yellow());
}

/// `-` for absent values in listings
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn print_empty(what: &str) {
    println!("{}", format!("No {} found", what).dimmed());
}
