use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod output;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.settings.load()?;
    match cli.command {
        Command::Impulses(args) => args.run(&config),
        Command::Stream(args) => args.run(&config),
        Command::Pvt(args) => args.run(&config),
        Command::Plane(args) => args.run(&config),
        Command::Simulate(args) => args.run(&config),
        Command::SimulatePlane(args) => args.run(&config),
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(name = "sordino", version, about = "Zero-vibration shaping of point-to-point moves")]
struct Cli {
    #[command(flatten)]
    settings: cli::Settings,

    /// Log pipeline details at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the shaper impulses for an axis.
    Impulses(cli::impulses::ImpulsesArgs),
    /// Shape a single-axis move into stream segments.
    Stream(cli::stream::StreamArgs),
    /// Shape a single-axis move into position-velocity-time samples.
    Pvt(cli::pvt::PvtArgs),
    /// Shape a straight XY move into planar stream segments.
    Plane(cli::plane::PlaneArgs),
    /// Run an absolute move against an in-memory actuator.
    Simulate(cli::simulate::SimulateArgs),
    /// Run an absolute XY line against an in-memory actuator pair.
    SimulatePlane(cli::simulate_plane::SimulatePlaneArgs),
}
