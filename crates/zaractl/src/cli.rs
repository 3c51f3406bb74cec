//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};

/// Zara Assistant CLI
#[derive(Parser)]
#[command(name = "zaractl")]
#[command(about = "Zara Assistant - hardware-aware I/O router", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to config file (overrides the default location)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show probed hardware and the method serving each action
    Status {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Capture one utterance via the best available input method
    Listen {
        /// Listen window in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Speak a message via the best available output method
    Say {
        /// Text to speak
        message: String,
    },

    /// Show a named expression (celebrate, thinking, listening)
    Visual {
        /// Expression name
        expression: String,
    },

    /// Recognize one gesture
    Gesture,

    /// Run the full hardware self test
    Doctor,

    /// Ask the language model a question
    Ask {
        /// The prompt
        prompt: String,
    },
}
