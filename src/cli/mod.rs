//! CLI module for Kapittel.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{mask_secret, Output};

use clap::{Parser, Subcommand};

/// Kapittel - YouTube chapters and summaries
///
/// Fetches a video's captions, splits them into topical sections and asks an LLM to title
/// and summarize them. "Kapittel" is Norwegian for "chapter."
#[derive(Parser, Debug)]
#[command(name = "kapittel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KAPITTEL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, segment, title and summarize a video
    Summarize {
        /// YouTube URL or video ID
        url: String,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, markdown, chapters)
        #[arg(long, default_value = "markdown")]
        format: String,

        /// Save to the configured output directory as <video_id>.<ext>
        #[arg(long, conflicts_with = "output")]
        save: bool,
    },

    /// Print the chapter list of a video
    Timestamps {
        /// YouTube URL or video ID
        url: String,
    },

    /// Summarize a single section of a video
    Section {
        /// YouTube URL or video ID
        url: String,

        /// Section number as shown by `timestamps` (1-based)
        section_id: usize,
    },

    /// Fetch captions only and print them as JSON
    Transcript {
        /// YouTube URL or video ID
        url: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show LLM provider status
    Providers {
        /// Send a short test prompt to every provider
        #[arg(long)]
        probe: bool,
    },

    /// Check API keys and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
