use crate::{
    config::Config,
    output::{Format, Summary, render},
};
use anyhow::Result;
use clap::Args;
use sordino_core::PvtGenerator;

#[derive(Args)]
pub struct PvtArgs {
    /// Signed move distance.
    #[arg(allow_hyphen_values = true)]
    pub distance: f64,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl PvtArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let generator = PvtGenerator::new(config.x.plant()?, config.x.shaper)
            .with_min_timestep(config.motion.min_timestep)?;
        let samples = generator.shape_trapezoidal_motion(
            self.distance,
            config.motion.acceleration,
            config.motion.deceleration(),
            config.motion.max_speed,
        )?;

        let summary = Summary::of(samples.as_slice());
        tracing::info!(
            samples = samples.len(),
            max_speed = summary.max_speed,
            total_time = summary.total_time,
            "sampled move of {}",
            self.distance
        );

        println!("{}", render(&samples, Some(summary), self.format)?);
        Ok(())
    }
}
