use crate::{
    config::Config,
    output::{Format, Summary, render},
};
use anyhow::Result;
use clap::Args;
use sordino_core::StreamGenerator;

#[derive(Args)]
pub struct StreamArgs {
    /// Signed move distance.
    #[arg(allow_hyphen_values = true)]
    pub distance: f64,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl StreamArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let generator = StreamGenerator::new(config.x.plant()?, config.x.shaper);
        let segments = generator.shape_trapezoidal_motion(
            self.distance,
            config.motion.acceleration,
            config.motion.deceleration(),
            config.motion.max_speed,
        )?;

        let summary = Summary::of(segments.as_slice());
        tracing::info!(
            segments = segments.len(),
            max_speed = summary.max_speed,
            total_time = summary.total_time,
            "shaped move of {}",
            self.distance
        );

        println!("{}", render(&segments, Some(summary), self.format)?);
        Ok(())
    }
}
