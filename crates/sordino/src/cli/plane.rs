use crate::{
    config::Config,
    output::{Format, Summary, render},
};
use anyhow::Result;
use clap::Args;
use sordino_core::PlanarStreamGenerator;

#[derive(Args)]
pub struct PlaneArgs {
    #[arg(allow_hyphen_values = true)]
    pub x: f64,

    #[arg(allow_hyphen_values = true)]
    pub y: f64,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl PlaneArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let y_axis = config.y_axis();
        let generator = PlanarStreamGenerator::new(
            config.x.plant()?,
            config.x.shaper,
            y_axis.plant()?,
            y_axis.shaper,
        );
        let segments = generator.shape_trapezoidal_motion(
            self.x,
            self.y,
            config.motion.acceleration,
            config.motion.deceleration(),
            config.motion.max_speed,
        )?;

        let summary = Summary::of(segments.as_slice());
        tracing::info!(
            segments = segments.len(),
            max_speed = summary.max_speed,
            total_time = summary.total_time,
            "shaped planar move to ({}, {})",
            self.x,
            self.y
        );

        println!("{}", render(&segments, Some(summary), self.format)?);
        Ok(())
    }
}
