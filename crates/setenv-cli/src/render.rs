//! Terminal rendering utilities.

use std::collections::BTreeMap;
use std::fmt::Display;

use console::{style, Emoji};
use setenv_core::SecretValue;
use setenv_secrets::SecretRef;

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Outcome of a single check.
pub enum Status {
    Ok,
    Warn,
    Fail,
}

/// Print an indented check line.
pub fn status(status: Status, message: impl Display) {
    let indicator = match status {
        Status::Ok => style(CHECK).green().to_string(),
        Status::Warn => style(WARN).yellow().to_string(),
        Status::Fail => style(CROSS).red().to_string(),
    };
    println!("  {} {}", indicator, message);
}

/// Print a one-line success message.
pub fn success(message: impl Display) {
    println!("{} {}", style(CHECK).green(), message);
}

/// Hide a secret's value, keeping only whether it is empty.
pub fn mask(value: &SecretValue) -> String {
    if value.is_empty() {
        "(empty)".to_string()
    } else {
        "********".to_string()
    }
}

/// Print one context's secrets as a two-column table.
pub fn print_secrets(secrets: &BTreeMap<String, SecretValue>, reveal: bool) {
    let width = secrets.keys().map(String::len).max().unwrap_or(0).max(4);
    println!("{:<width$}  {}", style("NAME").bold(), style("VALUE").bold());
    for (key, value) in secrets {
        let shown = if reveal {
            value.expose().to_string()
        } else {
            mask(value)
        };
        println!("{:<width$}  {}", key, shown);
    }
}

/// Print stored entries grouped by context.
pub fn print_entries(entries: &[SecretRef]) {
    let mut current: Option<&str> = None;
    for entry in entries {
        if current != Some(entry.context.as_str()) {
            println!("{}", style(&entry.context).bold().cyan());
            current = Some(entry.context.as_str());
        }
        println!("  {}", entry.key);
    }
    println!("\n{} secret(s) total.", entries.len());
}
