//! CLI parsing for intake

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Fetch, normalize and summarize code analysis results", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (defaults to ./intake.toml when present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize an analysis payload read from a file or stdin
    Normalize(commands::normalize::Args),

    /// Print the detected shape of an analysis payload
    Classify(commands::classify::Args),

    /// Fetch the results of an analysis task, falling back to the last known results
    Fetch(commands::fetch::Args),

    /// Show the progress of an analysis task
    Progress(commands::progress::Args),

    /// List past analyses
    History(commands::history::Args),

    /// Analyze source files locally with the built-in rules
    Scan(commands::scan::Args),
}
