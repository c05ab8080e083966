use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sordino_core::{PlantModel, ShaperFamily, actuator::AxisLimits, stream::DEFAULT_MIN_TIMESTEP};
use std::{fs, path::Path};

/// Shaping configuration for the `sordino` tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// X axis plant and shaper
    #[serde(default)]
    pub x: AxisConfig,

    /// Y axis plant and shaper, a copy of `x` when absent
    #[serde(default)]
    pub y: Option<AxisConfig>,

    /// Move limits shared by every command
    #[serde(default)]
    pub motion: MotionConfig,

    /// Travel range and addressable minimums of the simulated actuator
    #[serde(default)]
    pub actuator: ActuatorConfig,
}

/// Resonance of one axis and the shaper tuned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Hz
    #[serde(default = "default_resonant_frequency")]
    pub resonant_frequency: f64,

    #[serde(default = "default_damping_ratio")]
    pub damping_ratio: f64,

    #[serde(default)]
    pub shaper: ShaperFamily,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            resonant_frequency: default_resonant_frequency(),
            damping_ratio: default_damping_ratio(),
            shaper: ShaperFamily::default(),
        }
    }
}

impl AxisConfig {
    pub fn plant(&self) -> Result<PlantModel> {
        Ok(PlantModel::new(self.resonant_frequency, self.damping_ratio)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,

    /// Defaults to `acceleration`
    #[serde(default)]
    pub deceleration: Option<f64>,

    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    /// Minimum seconds between pvt samples
    #[serde(default = "default_min_timestep")]
    pub min_timestep: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            acceleration: default_acceleration(),
            deceleration: None,
            max_speed: default_max_speed(),
            min_timestep: default_min_timestep(),
        }
    }
}

impl MotionConfig {
    pub fn deceleration(&self) -> f64 {
        self.deceleration.unwrap_or(self.acceleration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    #[serde(default)]
    pub min_position: f64,

    #[serde(default = "default_max_position")]
    pub max_position: f64,

    #[serde(default = "default_min_step")]
    pub min_acceleration: f64,

    #[serde(default = "default_min_step")]
    pub min_speed: f64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            min_position: 0.0,
            max_position: default_max_position(),
            min_acceleration: default_min_step(),
            min_speed: default_min_step(),
        }
    }
}

fn default_resonant_frequency() -> f64 {
    4.64
}

fn default_damping_ratio() -> f64 {
    0.04
}

fn default_acceleration() -> f64 {
    2100.0
}

fn default_max_speed() -> f64 {
    1000.0
}

fn default_min_timestep() -> f64 {
    DEFAULT_MIN_TIMESTEP
}

fn default_max_position() -> f64 {
    1000.0
}

fn default_min_step() -> f64 {
    0.001
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    pub fn y_axis(&self) -> &AxisConfig {
        self.y.as_ref().unwrap_or(&self.x)
    }

    /// Limits handed to the simulated actuator.
    pub fn axis_limits(&self) -> AxisLimits {
        AxisLimits {
            acceleration: self.motion.acceleration,
            deceleration: self.motion.deceleration(),
            max_speed: self.motion.max_speed,
            min_position: self.actuator.min_position,
            max_position: self.actuator.max_position,
            min_acceleration: self.actuator.min_acceleration,
            min_speed: self.actuator.min_speed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.x.plant().context("invalid [x] axis")?;
        self.y_axis().plant().context("invalid [y] axis")?;

        for (key, value) in [
            ("motion.acceleration", self.motion.acceleration),
            ("motion.deceleration", self.motion.deceleration()),
            ("motion.max_speed", self.motion.max_speed),
            ("motion.min_timestep", self.motion.min_timestep),
        ] {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("{key} must be a positive number, got {value}");
            }
        }

        self.axis_limits()
            .validate()
            .context("invalid [actuator] limits")?;

        Ok(())
    }
}
