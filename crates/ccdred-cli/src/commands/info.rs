use std::path::PathBuf;

use anyhow::Result;
use ccdred_core::io::fits::FitsReader;
use ccdred_core::stats::image_stats;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsReader::open(&args.file)?;
    let frame = reader.read_frame()?;
    let stats = image_stats(&frame.data)?;

    println!("File:        {}", args.file.display());
    println!(
        "Dimensions:  {}x{}",
        reader.info.width, reader.info.height
    );
    println!("BITPIX:      {}", reader.info.bitpix);
    if reader.info.bscale != 1.0 || reader.info.bzero != 0.0 {
        println!(
            "Scaling:     BSCALE={} BZERO={}",
            reader.info.bscale, reader.info.bzero
        );
    }

    if let Some(object) = frame.header.get_text("OBJECT") {
        println!("Object:      {}", object);
    }
    if let Some(filter) = frame.header.get_text("FILTER") {
        println!("Filter:      {}", filter);
    }
    if let Some(exptime) = frame.header.get_real("EXPTIME") {
        println!("Exposure:    {} s", exptime);
    }
    println!("Cards:       {}", frame.header.len());

    println!();
    println!("Mean:        {:.4}", stats.mean);
    println!("Median:      {:.4}", stats.median);
    println!("Mode est.:   {:.4}", stats.mode);
    println!("Min/Max:     {:.4} / {:.4}", stats.min, stats.max);
    println!("Pixels:      {}", stats.npix);

    Ok(())
}
