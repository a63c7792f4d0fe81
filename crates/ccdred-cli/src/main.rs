mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccdred", about = "CCD image calibration tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show FITS file metadata and statistics
    Info(commands::info::InfoArgs),
    /// Combine bias frames into a master bias
    Bias(commands::bias::BiasArgs),
    /// Build normalized flat fields per filter
    Flat(commands::flat::FlatArgs),
    /// Bias- and flat-correct a single raw frame
    Correct(commands::correct::CorrectArgs),
    /// Run the full reduction pipeline
    Run(commands::run::RunArgs),
    /// Print or save a default reduction config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Bias(args) => commands::bias::run(args),
        Commands::Flat(args) => commands::flat::run(args),
        Commands::Correct(args) => commands::correct::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
