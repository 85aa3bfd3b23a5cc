//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Calendar timeline layout engine.
///
/// Lays out a range of days from an events file and replays scripted
/// pointer gestures against it.
#[derive(Debug, Parser)]
#[command(name = "tg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the laid-out timeline for a range of days.
    Layout {
        #[command(flatten)]
        range: RangeArgs,

        /// Output the full render frame as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replay a gesture script and print the intents it produces.
    Replay {
        /// JSON file with the gesture steps.
        #[arg(long)]
        script: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Output the final render frame as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration.
    Config,
}

/// Which events to load and which days to show.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Events file. Defaults to the configured `events_path`.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// First visible day (YYYY-MM-DD). Defaults to this week's Monday.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Number of visible days.
    #[arg(long, default_value_t = 7)]
    pub days: u32,
}
