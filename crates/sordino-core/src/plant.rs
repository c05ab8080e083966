//! Single-mode resonance model of the driven structure.

use crate::error::{Result, ShapingError, require_positive};

/// Resonant frequency and damping ratio of the dominant mode of one axis.
///
/// Values are validated on construction and never change afterwards; the
/// `with_*` methods return a new, validated model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantModel {
    resonant_frequency: f64,
    damping_ratio: f64,
}

impl PlantModel {
    pub fn new(resonant_frequency: f64, damping_ratio: f64) -> Result<Self> {
        let resonant_frequency = require_positive("resonant_frequency", resonant_frequency)?;
        let damping_ratio = check_damping(damping_ratio)?;
        Ok(Self {
            resonant_frequency,
            damping_ratio,
        })
    }

    /// Resonant frequency in Hz.
    pub fn resonant_frequency(&self) -> f64 {
        self.resonant_frequency
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    /// Resonant period in seconds.
    pub fn resonant_period(&self) -> f64 {
        1.0 / self.resonant_frequency
    }

    pub fn with_resonant_frequency(self, resonant_frequency: f64) -> Result<Self> {
        Self::new(resonant_frequency, self.damping_ratio)
    }

    pub fn with_damping_ratio(self, damping_ratio: f64) -> Result<Self> {
        Self::new(self.resonant_frequency, damping_ratio)
    }
}

fn check_damping(value: f64) -> Result<f64> {
    let reason = if !value.is_finite() {
        "must be finite"
    } else if value < 0.0 {
        "must be greater than or equal to 0"
    } else if value >= 1.0 {
        // the decay factor has no real value for critically or over damped modes
        "must be less than 1"
    } else {
        return Ok(value);
    };
    Err(ShapingError::InvalidParameter {
        name: "damping_ratio",
        value,
        reason,
    })
}
