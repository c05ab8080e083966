use crate::config::Config;
use anyhow::Result;
use clap::Args;
use sordino_core::ShaperFamily;
use std::path::PathBuf;

pub mod impulses;
pub mod plane;
pub mod pvt;
pub mod simulate;
pub mod simulate_plane;
pub mod stream;

/// Configuration file plus per-invocation overrides.
#[derive(Args, Debug, Default)]
pub struct Settings {
    /// Path to the configuration file (TOML or JSON).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub acceleration: Option<f64>,

    #[arg(long, global = true)]
    pub deceleration: Option<f64>,

    #[arg(long, global = true)]
    pub max_speed: Option<f64>,

    /// Minimum seconds between pvt samples.
    #[arg(long, global = true)]
    pub min_timestep: Option<f64>,

    /// Resonant frequency in Hz, applied to both axes.
    #[arg(long, global = true)]
    pub frequency: Option<f64>,

    /// Damping ratio, applied to both axes.
    #[arg(long, global = true)]
    pub damping: Option<f64>,

    /// Shaper family (zv, zvd, zvdd), applied to both axes.
    #[arg(long, global = true)]
    pub shaper: Option<ShaperFamily>,
}

impl Settings {
    /// Reads the configuration file, if any, and applies overrides.
    pub fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let config = Config::from_file(path)?;
                tracing::info!("loaded configuration from {}", path.display());
                config
            }
            None => Config::default(),
        };
        self.apply(&mut config);
        config.validate()?;

        tracing::debug!(?config, "effective configuration");
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(value) = self.acceleration {
            config.motion.acceleration = value;
        }
        if let Some(value) = self.deceleration {
            config.motion.deceleration = Some(value);
        }
        if let Some(value) = self.max_speed {
            config.motion.max_speed = value;
        }
        if let Some(value) = self.min_timestep {
            config.motion.min_timestep = value;
        }

        let axes = std::iter::once(&mut config.x).chain(config.y.as_mut());
        for axis in axes {
            if let Some(value) = self.frequency {
                axis.resonant_frequency = value;
            }
            if let Some(value) = self.damping {
                axis.damping_ratio = value;
            }
            if let Some(value) = self.shaper {
                axis.shaper = value;
            }
        }
    }
}
