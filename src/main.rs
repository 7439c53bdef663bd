mod cli;
mod commands;
mod grid;
mod model;
mod session;
mod ui;

use anyhow::Result;
use clap::Parser;
use flexi_logger::{FileSpec, Logger};
use std::path::Path;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logger(args.log_file.as_deref())?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Show { month } => commands::show(month),
        cli::Command::Tui => commands::tui(),
    }
}

fn init_logger(log_file: Option<&Path>) -> Result<()> {
    let mut logger = Logger::try_with_env_or_str("info")?;
    if let Some(path) = log_file {
        logger = logger.log_to_file(FileSpec::try_from(path.to_path_buf())?);
    }
    logger.start()?;
    Ok(())
}
