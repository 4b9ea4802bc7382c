use crate::analysis::{Analysis, Command};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

pub mod analysis;
pub mod comparison;
pub mod dataset;
pub mod inference;
pub mod render;
pub mod utils;

#[derive(Parser, Debug)]
#[command(name = "analysis", version, about = "Traffic-light detection analysis toolkit")]
struct Cli {
    /// TOML file with a [Config] table.
    #[arg(long, global = true, default_value = "analysis.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let success = Analysis::run(&cli.config, cli.command).await;
    Analysis::terminate().await;
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
