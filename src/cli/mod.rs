//! Parley command line interface.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley - a chat bot you teach by talking to it.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "parley.toml")]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a configuration and an empty knowledge store.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// User id allowed to run /keys and /stats.
        #[arg(long, allow_negative_numbers = true)]
        admin_id: Option<i64>,

        /// Group wake word, repeatable (default: hey, Hey, HEY).
        #[arg(long = "wake-word", value_name = "WORD")]
        wake_words: Vec<String>,
    },

    /// Runs the bot over newline-delimited JSON on stdin/stdout.
    Serve,

    /// Talks to the bot in a private conversation on the terminal.
    Chat {
        /// Conversation id to use.
        #[arg(long, default_value_t = 1)]
        chat_id: i64,
    },

    /// Lists every learned key.
    Keys,

    /// Exports the knowledge store to a JSON file.
    Export {
        /// Output file.
        output: PathBuf,
    },

    /// Imports knowledge from a JSON export.
    Import {
        /// Input file.
        input: PathBuf,
    },

    /// Edits options interactively.
    Config,

    /// Shows the version.
    Version,
}
