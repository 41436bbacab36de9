//! Command-line arguments
//!
//! Flags override the environment, which overrides the config file, which
//! overrides the built-in reel.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use reel_core::{load_config, load_config_from_path, ConfigOverrides, ReelConfig};

/// Default headless run length
pub const DEFAULT_RUN_FOR_MS: u64 = 60_000;

/// termreel - looping multi-pane terminal presentations
#[derive(Parser, Debug, Clone)]
#[command(name = "termreel")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a reel file (TOML)
    #[arg(short, long, env = "REEL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for typing jitter and fill steps
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Run on virtual time without a terminal and print the journal
    #[arg(long)]
    pub headless: bool,

    /// Virtual milliseconds to simulate in headless mode
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_RUN_FOR_MS)]
    pub run_for_ms: u64,

    /// Print the headless journal as JSON lines
    #[arg(long, requires = "headless")]
    pub json: bool,

    /// Playback speed multiplier (2.0 plays twice as fast)
    #[arg(long, value_name = "SCALE")]
    pub time_scale: Option<f64>,

    /// Write logs to this file (terminal mode only logs when set)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Overrides carried by the flags
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(seed) = self.seed {
            overrides = overrides.with_seed(seed);
        }
        if let Some(scale) = self.time_scale {
            overrides = overrides.with_time_scale(scale);
        }
        overrides
    }

    /// Resolve the full configuration stack
    ///
    /// An explicit `--config` must exist; the default path may be absent.
    pub fn load_config(&self) -> anyhow::Result<ReelConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                load_config_from_path(Some(path.clone()))
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            None => load_config().context("failed to load configuration")?,
        };
        self.overrides()
            .apply(&mut config)
            .context("invalid command-line override")?;
        Ok(config)
    }
}
