use crate::{
    config::Config,
    output::{Format, Summary, render},
};
use anyhow::Result;
use clap::Args;
use sordino_core::actuator::{RecordingPlanarActuator, ShapedPlane};

#[derive(Args)]
pub struct SimulatePlaneArgs {
    /// Absolute X target.
    #[arg(allow_hyphen_values = true)]
    pub x: f64,

    /// Absolute Y target.
    #[arg(allow_hyphen_values = true)]
    pub y: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub start_x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub start_y: f64,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl SimulatePlaneArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        // both axes share the [actuator] limits
        let limits = config.axis_limits();
        let actuator =
            RecordingPlanarActuator::new((self.start_x, self.start_y), limits, limits);
        let y_axis = config.y_axis();
        let mut plane = ShapedPlane::new(
            actuator,
            config.x.plant()?,
            config.x.shaper,
            y_axis.plant()?,
            y_axis.shaper,
        )?;
        let segments = plane.move_absolute(self.x, self.y, None)?;

        let actuator = plane.into_actuator();
        let (x, y) = actuator.position;
        if actuator.batches.is_empty() {
            tracing::info!("already at ({x}, {y}), nothing sent");
        } else {
            tracing::info!(
                batches = actuator.batches.len(),
                "actuator moved from ({}, {}) to ({x}, {y})",
                self.start_x,
                self.start_y
            );
        }

        let summary = Summary::of(segments.as_slice());
        println!("{}", render(&segments, Some(summary), self.format)?);
        Ok(())
    }
}
