use std::path::PathBuf;

use anyhow::Result;
use ccdred_core::calibrate::normalized_flat;
use ccdred_core::io::discover::find_flats;
use ccdred_core::io::fits::{read_fits, write_fits};
use clap::Args;

#[derive(Args)]
pub struct FlatArgs {
    /// Directory holding flat_<filter>_<exptime>_NNN.fits frames
    pub data_dir: PathBuf,

    /// Comma-separated filter names
    #[arg(long, default_value = "v,r,i")]
    pub filters: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,
}

pub fn run(args: &FlatArgs) -> Result<()> {
    std::fs::create_dir_all(&args.outdir)?;

    for filter in args.filters.split(',').map(str::trim) {
        let paths = find_flats(&args.data_dir, filter)?;
        if paths.is_empty() {
            println!("No flat frames found for filter {filter}");
            continue;
        }
        println!("Combining {} flat frames for filter {filter}...", paths.len());

        let frames = paths
            .iter()
            .map(|p| read_fits(p))
            .collect::<ccdred_core::error::Result<Vec<_>>>()?;
        let (flat, stats) = normalized_flat(&frames)?;

        let out = args.outdir.join(format!("normalised_flat_{filter}.fits"));
        write_fits(&out, &flat)?;
        println!("  stats: {stats}");
        println!("  saved to {}", out.display());
    }

    Ok(())
}
