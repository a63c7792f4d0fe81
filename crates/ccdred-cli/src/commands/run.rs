use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use ccdred_core::pipeline::config::ReductionConfig;
use ccdred_core::pipeline::{run_reduction_reported, ProgressReporter, ReductionStage};
use ccdred_core::post::CosmicRayParams;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::{print_result_summary, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Directory holding the raw frames (bias_NNN, flat_<filter>_<exptime>_NNN,
    /// <object>_<filter>_<exptime>_NNN, all lowercase .fits)
    pub data_dir: Option<PathBuf>,

    /// Reduction config file (TOML); overrides the other flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Object name prefix of the science frames
    #[arg(long)]
    pub object: Option<String>,

    /// Comma-separated filter names
    #[arg(long, default_value = "v,r,i")]
    pub filters: String,

    /// Output directory (default: <data_dir>/processed)
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Reshape corrected frames to HEIGHTxWIDTH (e.g. 2048x2048)
    #[arg(long)]
    pub reshape: Option<String>,

    /// CCD gain in e-/ADU for cosmic-ray cleaning
    #[arg(long, default_value = "1.0")]
    pub gain: f64,

    /// CCD read noise in e- for cosmic-ray cleaning
    #[arg(long, default_value = "5.0")]
    pub readnoise: f64,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid reduction config")?
    } else {
        build_config_from_args(args)?
    };

    // No cosmic-ray capability ships with the CLI; the step passes
    // frames through unchanged (library users can inject a cleaner).
    let has_cleaner = false;
    print_run_summary(&config, has_cleaner);

    let reporter = Arc::new(ProgressBarReporter::new()?);
    let summary = run_reduction_reported(&config, None, reporter)?;

    print_result_summary(&summary);
    println!("Processing complete.");
    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> Result<ReductionConfig> {
    let Some(ref data_dir) = args.data_dir else {
        bail!("Either a data directory or --config must be given");
    };
    let Some(ref object) = args.object else {
        bail!("--object is required without --config");
    };

    let reshape = args.reshape.as_deref().map(parse_reshape).transpose()?;

    Ok(ReductionConfig {
        data_dir: data_dir.clone(),
        output_dir: args
            .outdir
            .clone()
            .unwrap_or_else(|| data_dir.join("processed")),
        object: object.clone(),
        filters: args
            .filters
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        reshape,
        cosmic_ray: CosmicRayParams {
            gain: args.gain,
            readnoise: args.readnoise,
            ..Default::default()
        },
    })
}

fn parse_reshape(spec: &str) -> Result<[usize; 2]> {
    let Some((h, w)) = spec.split_once('x') else {
        bail!("Invalid reshape spec '{spec}', expected HEIGHTxWIDTH");
    };
    Ok([
        h.trim().parse().context("Invalid reshape height")?,
        w.trim().parse().context("Invalid reshape width")?,
    ])
}

/// Drives one indicatif bar per reduction stage.
struct ProgressBarReporter {
    style: ProgressStyle,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressBarReporter {
    fn new() -> Result<Self> {
        let style = ProgressStyle::default_bar()
            .template("{msg:24} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> ");
        Ok(Self {
            style,
            bar: Mutex::new(None),
        })
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn begin_stage(&self, stage: ReductionStage, total_items: Option<usize>) {
        let pb = match total_items {
            Some(n) => {
                let pb = ProgressBar::new(n as u64);
                pb.set_style(self.style.clone());
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        pb.set_message(stage.to_string());
        *self.bar.lock().expect("reporter mutex poisoned") = Some(pb);
    }

    fn advance(&self, items_done: usize) {
        if let Some(ref pb) = *self.bar.lock().expect("reporter mutex poisoned") {
            pb.set_position(items_done as u64);
        }
    }

    fn finish_stage(&self) {
        if let Some(pb) = self.bar.lock().expect("reporter mutex poisoned").take() {
            pb.finish();
        }
    }
}
