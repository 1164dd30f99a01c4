//! Configuration resolution for the server binary.
//!
//! Precedence: defaults, then an optional TOML file, then environment
//! variables, then command-line flags.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use edgeline_core::{Config, Error, Result};

/// Environment override for the data root.
pub const ENV_DATA_DIR: &str = "EDGELINE_DATA_DIR";
/// Environment override for the listen address.
pub const ENV_LISTEN: &str = "EDGELINE_LISTEN";

#[derive(Debug, Parser)]
#[command(name = "edgeline-server", about = "Edge-mask processing service")]
pub struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind, e.g. 0.0.0.0:8080.
    #[arg(long)]
    pub listen: Option<String>,

    /// Root directory for the artifact stores.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Also persist the raw probability map next to each mask.
    #[arg(long)]
    pub save_probability_map: bool,
}

/// Resolve the effective configuration from all sources.
pub fn resolve(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration file");
            Config::from_file(path)?
        }
        None => {
            let default_path = Path::new("edgeline.toml");
            if default_path.exists() {
                info!("Loading ./edgeline.toml");
                Config::from_file(default_path)?
            } else {
                Config::default()
            }
        }
    };

    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(addr) = std::env::var(ENV_LISTEN) {
        config.listen_addr = addr;
    }

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(addr) = &args.listen {
        config.listen_addr = addr.clone();
    }
    if args.save_probability_map {
        config.save_probability_map = true;
    }

    config.validate()?;
    if config.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(Error::Configuration(format!(
            "listen_addr {:?} is not a valid socket address",
            config.listen_addr
        )));
    }
    Ok(config)
}
