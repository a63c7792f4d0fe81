use std::path::PathBuf;

use anyhow::Result;
use ccdred_core::correct::{bias_correct, flat_correct};
use ccdred_core::io::fits::{read_fits, write_fits};
use clap::Args;

#[derive(Args)]
pub struct CorrectArgs {
    /// Raw science frame
    pub file: PathBuf,

    /// Master bias file
    #[arg(long)]
    pub bias: PathBuf,

    /// Normalized flat file; without it only the bias is subtracted
    #[arg(long)]
    pub flat: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "corrected.fits")]
    pub output: PathBuf,
}

pub fn run(args: &CorrectArgs) -> Result<()> {
    let raw = read_fits(&args.file)?;
    let bias = read_fits(&args.bias)?;

    let mut result = bias_correct(&raw, &bias)?;
    if let Some(ref flat_path) = args.flat {
        let flat = read_fits(flat_path)?;
        result = flat_correct(&result, &flat)?;
    }

    write_fits(&args.output, &result)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
