use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// healthprobe: single-host health probe
///
/// Samples CPU, memory and disk usage, appends the reading to a CSV log,
/// mails an alert when CPU crosses the threshold, and mails a PDF report
/// charting the whole history.
#[derive(Parser, Debug)]
#[command(name = "healthprobe")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample, log, report and deliver once
    #[command(alias = "r")]
    Run {
        /// CPU alert threshold in percent (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Build the report but send no mail
        #[arg(long)]
        no_send: bool,
    },

    /// Show current system usage without logging it
    #[command(alias = "s")]
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarise the recorded history
    #[command(alias = "h")]
    History {
        /// Number of most recent rows to list
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Command used when none is given on the command line.
    #[must_use]
    pub const fn default_run() -> Self {
        Self::Run {
            threshold: None,
            no_send: false,
        }
    }
}
