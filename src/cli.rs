use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datebook", version, about = "Terminal month calendar with per-date notes")]
pub struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a month grid and exit
    Show {
        /// Month to print in YYYY-MM form (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Launch the interactive calendar (default)
    Tui,
}
