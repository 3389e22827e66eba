//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::{OutputFormat, DEFAULT_EXPORT_FILE};

/// Quote Keeper - keep, filter and sync a personal quote collection.
#[derive(Parser, Debug)]
#[command(name = "quote-keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: table, json, or plain.
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote from the selected category.
    Show,

    /// List quotes, optionally switching the selected category.
    List {
        /// Category to show ("all" for every quote). Remembered for next time.
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List the distinct categories.
    Categories,

    /// Add a new quote.
    Add {
        /// Quote text.
        text: String,

        /// Quote category.
        category: String,
    },

    /// Export all quotes to a JSON file.
    Export {
        /// Output file path.
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },

    /// Import quotes from a JSON file exported earlier.
    Import {
        /// Snapshot file to append.
        path: PathBuf,
    },

    /// Merge the remote quote list into the local collection once.
    Sync,

    /// Keep syncing on the configured interval until interrupted.
    Watch,

    /// Show the effective configuration.
    Config {
        /// Write the default configuration file if none exists.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
