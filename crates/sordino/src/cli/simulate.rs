use crate::{
    config::Config,
    output::{Format, Summary, render},
};
use anyhow::Result;
use clap::Args;
use sordino_core::actuator::{RecordingActuator, ShapedAxis};

#[derive(Args)]
pub struct SimulateArgs {
    /// Absolute target position.
    #[arg(allow_hyphen_values = true)]
    pub position: f64,

    /// Position the actuator starts at.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub start: f64,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl SimulateArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let actuator = RecordingActuator::new(self.start, config.axis_limits());
        let mut axis = ShapedAxis::new(actuator, config.x.plant()?, config.x.shaper)?;
        let segments = axis.move_absolute(self.position, None)?;

        let actuator = axis.into_actuator();
        if actuator.batches.is_empty() {
            tracing::info!("already at {}, nothing sent", actuator.position);
        } else {
            tracing::info!(
                batches = actuator.batches.len(),
                "actuator moved from {} to {}",
                self.start,
                actuator.position
            );
        }

        let summary = Summary::of(segments.as_slice());
        println!("{}", render(&segments, Some(summary), self.format)?);
        Ok(())
    }
}
