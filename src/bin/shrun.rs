// src/bin/shrun.rs

use clap::Parser;
use colored::Colorize;
use shrun::cli::{self, Cli};
use std::process::ExitCode;

/// The entry point of the `shrun` binary: set up logging, parse arguments,
/// run, and map every hard failure through one formatted error line.
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match cli::run_cli(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", "Error".red().bold());
            ExitCode::FAILURE
        }
    }
}
