use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML, YAML or JSON). Defaults to `reader.toml` in
    /// the user configuration directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Save a URL, fetching and extracting it unless it is already stored
    Add { url: String },
    /// Fetch and extract a stored URL again
    Update {
        /// Numeric ID or short ID
        id: String,
    },
    /// Print a stored article
    Show {
        /// Numeric ID or short ID
        id: String,
        /// Print the article HTML instead of its text
        #[arg(long)]
        html: bool,
    },
    /// List stored URLs
    List,
    /// Print a random stored article
    Random,
    /// Print the canonical form of a URL
    Clean { url: String },
    /// Print the short ID for a numeric ID
    Encode { id: u64 },
    /// Print the numeric ID for a short ID
    Decode { short: String },
}

impl Cli {
    /// Default log level for the `-v` count; `RUST_LOG` takes precedence.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
