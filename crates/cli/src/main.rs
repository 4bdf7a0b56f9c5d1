use anyhow::Result;
use clap::Parser;

mod cli;
mod config;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.run()
}
