//! Output formatting for quotes and sync results.
//!
//! Supports multiple output formats: plain text, JSON, and table view.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{MergeOutcome, QuoteRecord, SyncState};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
    /// One quote per paragraph.
    Plain,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(format!("Unknown format: {s}. Use: table, json, plain")),
        }
    }
}

/// Formats one quote for display.
pub fn format_quote(quote: &QuoteRecord) -> String {
    format!(
        "{} {}\n{} {}",
        "Quote:".bold(),
        quote.text,
        "Category:".italic(),
        quote.category.cyan()
    )
}

/// Formats a list of quotes in the requested format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn format_quotes(
    quotes: &[&QuoteRecord],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(format_quotes_table(quotes)),
        OutputFormat::Json => serde_json::to_string_pretty(quotes),
        OutputFormat::Plain => Ok(quotes
            .iter()
            .map(|q| format!("{}\n  {}", q.text.bold(), q.category.italic()))
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}

/// Formats a table listing of quotes.
pub fn format_quotes_table(quotes: &[&QuoteRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Category", "Quote"]);

    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            &(i + 1).to_string(),
            &quote.category,
            &truncate(&quote.text, 70),
        ]);
    }

    table.to_string()
}

/// Formats the category list, marking the selected one.
pub fn format_categories(categories: &[String], selected: Option<&str>) -> String {
    let mut out = format!("{}\n", "🏷  Categories".bold());
    for category in categories {
        if Some(category.as_str()) == selected {
            out.push_str(&format!("  * {}\n", category.green().bold()));
        } else {
            out.push_str(&format!("    {category}\n"));
        }
    }
    out.push_str(&format!("\nTotal: {} categories", categories.len()));
    out
}

/// Formats the notification shown after a sync.
pub fn format_sync_notice(outcome: &MergeOutcome, message: &str) -> String {
    let mut out = format!("{} {}", "✓".green().bold(), message);
    if !outcome.added.is_empty() || outcome.skipped > 0 {
        out.push_str(&format!(
            " ({} new, {} already present)",
            outcome.added.len().to_string().cyan(),
            outcome.skipped
        ));
    }
    for quote in &outcome.added {
        out.push_str(&format!("\n  + {}", truncate(&quote.text, 70)));
    }
    out
}

/// Formats the reconciler state for display.
pub fn format_sync_state(state: &SyncState) -> String {
    let last_sync = state.last_sync.map_or_else(
        || "never".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    let phase = if state.is_syncing() {
        state.phase.to_string().yellow()
    } else {
        state.phase.to_string().cyan()
    };

    let mut out = format!(
        "{}\n  Phase: {}\n  Last sync: {}\n  Added last time: {}",
        "🔄 Sync Status".bold(),
        phase,
        last_sync,
        state.last_added
    );
    if let Some(error) = &state.last_error {
        out.push_str(&format!("\n  Last error: {}", error.red()));
    }
    out
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
