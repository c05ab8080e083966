use crate::{
    config::Config,
    output::{Format, render},
};
use anyhow::Result;
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Axis {
    #[default]
    X,
    Y,
}

#[derive(Args)]
pub struct ImpulsesArgs {
    #[arg(long, value_enum, default_value_t)]
    pub axis: Axis,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,
}

impl ImpulsesArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let axis = match self.axis {
            Axis::X => &config.x,
            Axis::Y => config.y_axis(),
        };
        let impulses = axis.shaper.impulses(&axis.plant()?);
        tracing::info!(
            shaper = %axis.shaper,
            count = impulses.len(),
            delay = impulses.duration(),
            "computed impulses"
        );

        println!("{}", render(impulses.as_slice(), None, self.format)?);
        Ok(())
    }
}
