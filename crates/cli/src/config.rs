use anyhow::Result;
use clap::Args;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Utility function to expand $HOME in a PathBuf
pub fn expand_home_in_path(path: &Path) -> Result<PathBuf> {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in path"))?;

    if path_str.contains("$HOME") {
        let expanded = path_str.replace("$HOME", home_dir.to_str().unwrap_or("."));
        Ok(PathBuf::from(expanded))
    } else {
        Ok(path.to_path_buf())
    }
}

#[derive(Config, Clone, Default, Serialize, Deserialize)]
#[config(layer_attr(derive(Args, Serialize, Clone)))]
pub struct AppConfig {
    #[config(nested, layer_attr(command(flatten)))]
    pub ledger: LedgerConfig,

    #[config(nested, layer_attr(command(flatten)))]
    pub codec: CodecConfig,

    #[config(nested, layer_attr(command(flatten)))]
    pub log: LogConfig,
}

#[derive(Clone, Config, Deserialize, Serialize, Default)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct LedgerConfig {
    /// Path of the JSON ledger snapshot (events, balances, confirmed milestone)
    #[config(
        default = "$HOME/.ezvote/ledger.json",
        env = "EZVOTE_SNAPSHOT",
        layer_attr(arg(long))
    )]
    pub snapshot_path: PathBuf,
}

#[derive(Clone, Config, Deserialize, Serialize, Default)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct CodecConfig {
    /// Whether participations are validated when encoding and decoding
    #[config(default = true, layer_attr(arg(long)))]
    pub validate: bool,
}

#[derive(Clone, Config, Deserialize, Serialize, Default)]
#[config(layer_attr(derive(Args, Clone, Serialize,)))]
pub struct LogConfig {
    /// Log filter directive, e.g. "info" or "ezvote_participation=debug"
    #[config(default = "info", env = "EZVOTE_LOG", layer_attr(arg(long = "log-filter")))]
    pub filter: String,
}

impl AppConfig {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve $HOME placeholders in configuration paths
    pub fn with_resolved_paths(mut self) -> Result<Self> {
        self.ledger.snapshot_path = expand_home_in_path(&self.ledger.snapshot_path)?;
        Ok(self)
    }
}
