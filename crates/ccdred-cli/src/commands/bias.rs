use std::path::PathBuf;

use anyhow::{bail, Result};
use ccdred_core::calibrate::master_bias;
use ccdred_core::io::discover::find_bias;
use ccdred_core::io::fits::{read_fits, write_fits};
use ccdred_core::stats::image_stats;
use clap::Args;

#[derive(Args)]
pub struct BiasArgs {
    /// Directory holding bias_NNN.fits frames
    pub data_dir: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "master_bias.fits")]
    pub output: PathBuf,
}

pub fn run(args: &BiasArgs) -> Result<()> {
    let paths = find_bias(&args.data_dir)?;
    if paths.is_empty() {
        bail!("No bias frames found in {}", args.data_dir.display());
    }
    println!("Combining {} bias frames...", paths.len());

    let frames = paths
        .iter()
        .map(|p| read_fits(p))
        .collect::<ccdred_core::error::Result<Vec<_>>>()?;
    let master = master_bias(&frames)?;
    write_fits(&args.output, &master)?;

    let stats = image_stats(&master.data)?;
    println!("Master bias: {}", stats);
    println!("Saved to {}", args.output.display());
    Ok(())
}
