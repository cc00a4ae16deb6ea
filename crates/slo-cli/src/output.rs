//! Output formatting utilities.

use colored::Colorize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format.
    Json,
}

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a labelled value.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Outputs a single item as pretty JSON.
pub fn output_json<T: serde::Serialize>(item: &T) -> crate::CliResult<()> {
    let json = serde_json::to_string_pretty(item)?;
    println!("{json}");
    Ok(())
}
