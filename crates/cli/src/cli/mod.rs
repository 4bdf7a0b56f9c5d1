use crate::config::{AppConfig, expand_home_in_path};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use confique::Config;
use ezvote_participation::{EventId, LedgerSnapshot, Participations, StatusAggregator};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// Re-export the config layer for public usage
pub use crate::config::confique_app_config_layer::AppConfigLayer;


#[derive(Parser)]
#[command(name = "ezvote-tally")]
#[command(about = "Decode participations and compute event status from a ledger snapshot")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "$HOME/.ezvote/config.toml")]
    config_path: PathBuf,

    /// Configuration object
    #[command(flatten)]
    config: AppConfigLayer,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Internal helper struct that holds the resolved configuration
pub struct ResolvedCli {
    command: Commands,
    config: AppConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode hex-encoded participations and print them as JSON
    Decode {
        /// Binary participations as hex, with or without 0x prefix
        hex: String,
    },
    /// Encode a participations JSON document as hex
    Encode {
        /// JSON file, or "-" for stdin
        input: PathBuf,
    },
    /// Compute the status of an event from the ledger snapshot
    Status {
        /// Event id as hex
        event_id: EventId,
    },
    /// Print the resolved configuration as TOML
    Config {
        /// Also write it to this file
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let verbose = self.verbose;
        let resolved_cli = self.resolve_config()?;

        let filter = if verbose {
            "debug"
        } else {
            resolved_cli.config.log.filter.as_str()
        };
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .init();

        let output = resolved_cli.handle_command()?;
        println!("{}", output);
        Ok(())
    }

    /// Load the configuration and resolve all $HOME placeholders
    fn resolve_config(self) -> Result<ResolvedCli> {
        let config_path = expand_home_in_path(&self.config_path)?;

        let config = AppConfig::builder()
            .preloaded(self.config)
            .env()
            .file(&config_path)
            .load()?
            .with_resolved_paths()?;

        Ok(ResolvedCli {
            command: self.command,
            config,
        })
    }
}

impl ResolvedCli {
    fn handle_command(&self) -> Result<String> {
        match &self.command {
            Commands::Decode { hex } => self.decode(hex),
            Commands::Encode { input } => {
                let json = read_input(input)?;
                self.encode(&json)
            }
            Commands::Status { event_id } => self.status(event_id),
            Commands::Config { write } => {
                if let Some(path) = write {
                    self.config.save(path)?;
                    info!("Configuration written to {}", path.display());
                }
                self.config.to_toml()
            }
        }
    }

    fn decode(&self, hex_input: &str) -> Result<String> {
        let bytes = hex::decode(hex_input.trim().trim_start_matches("0x"))
            .context("input is not valid hex")?;
        let (participations, consumed) = Participations::decode(&bytes, self.config.codec.validate)?;
        if consumed < bytes.len() {
            warn!("{} trailing bytes after participations ignored", bytes.len() - consumed);
        }
        info!("Decoded {} participations", participations.len());
        Ok(serde_json::to_string_pretty(&participations)?)
    }

    fn encode(&self, json: &str) -> Result<String> {
        let participations = Participations::from_json_str(json)?;
        let bytes = participations.encode(self.config.codec.validate)?;
        info!("Encoded {} participations into {} bytes", participations.len(), bytes.len());
        Ok(format!("0x{}", hex::encode(bytes)))
    }

    fn status(&self, event_id: &EventId) -> Result<String> {
        let snapshot_path = &self.config.ledger.snapshot_path;
        debug!("Loading ledger snapshot from {}", snapshot_path.display());
        let ledger = LedgerSnapshot::load(snapshot_path)
            .with_context(|| format!("failed to load ledger snapshot {}", snapshot_path.display()))?;

        let status = StatusAggregator::from_ledger(&ledger).event_status(event_id)?;
        info!(
            "Event {} is {} at milestone {} (checksum {})",
            event_id, status.status, status.milestone_index, status.checksum
        );
        Ok(serde_json::to_string_pretty(&status)?)
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))
    }
}
