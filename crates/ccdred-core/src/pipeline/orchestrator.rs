use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::calibrate::{master_bias, normalized_flat};
use crate::correct::{bias_correct, flat_correct};
use crate::error::Result;
use crate::frame::Frame;
use crate::io::discover::{find_bias, find_flats, find_science, parse_name};
use crate::io::fits::{read_fits, write_fits};
use crate::post::{cosmic_ray_clean, reshape, CosmicRayCleaner};

use super::config::ReductionConfig;
use super::types::{NoOpReporter, ProgressReporter, ReductionStage, ReductionSummary};

/// A corrected science frame on disk, tagged with its filter.
struct CorrectedFile {
    path: PathBuf,
    filter: String,
}

/// Run the full reduction: master bias, normalized flats, bias and flat
/// correction, optional reshape, optional cosmic-ray cleaning.
///
/// `cleaner` is the externally provided cosmic-ray capability; when
/// absent that step is skipped rather than failing the run. Filters
/// with no flat frames are skipped with a warning; every other error is
/// fatal to the run.
pub fn run_reduction_reported(
    config: &ReductionConfig,
    cleaner: Option<Arc<dyn CosmicRayCleaner>>,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ReductionSummary> {
    std::fs::create_dir_all(&config.output_dir)?;
    let mut summary = ReductionSummary::default();

    // 1. Master bias
    reporter.begin_stage(ReductionStage::MasterBias, None);
    let bias_paths = find_bias(&config.data_dir)?;
    info!(frames = bias_paths.len(), "Combining bias frames");
    let bias_frames = load_frames(&bias_paths)?;
    let bias = master_bias(&bias_frames)?;
    drop(bias_frames);
    let bias_path = config.output_dir.join("master_bias.fits");
    write_fits(&bias_path, &bias)?;
    summary.master_bias = Some(bias_path);
    reporter.finish_stage();

    // 2. Normalized flats, per filter
    reporter.begin_stage(ReductionStage::MasterFlats, Some(config.filters.len()));
    let mut flats: HashMap<String, Frame> = HashMap::new();
    for (i, filter) in config.filters.iter().enumerate() {
        let flat_paths = find_flats(&config.data_dir, filter)?;
        if flat_paths.is_empty() {
            warn!(%filter, "No flat frames found, skipping filter");
            reporter.advance(i + 1);
            continue;
        }
        let flat_frames = load_frames(&flat_paths)?;
        let (flat, stats) = normalized_flat(&flat_frames)?;
        info!(%filter, %stats, "Combined flat statistics");
        let path = config
            .output_dir
            .join(format!("normalised_flat_{filter}.fits"));
        write_fits(&path, &flat)?;
        summary.flats.push((filter.clone(), path));
        flats.insert(filter.clone(), flat);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    // 3. Bias correction
    let raw_paths = find_science(&config.data_dir, &config.object)?;
    reporter.begin_stage(ReductionStage::BiasCorrection, Some(raw_paths.len()));
    let mut corrected: Vec<CorrectedFile> = Vec::with_capacity(raw_paths.len());
    for (i, raw_path) in raw_paths.iter().enumerate() {
        let raw = read_fits(raw_path)?;
        let result = bias_correct(&raw, &bias)?;
        let out = prefixed_path(&config.output_dir, "biascorr", raw_path);
        write_fits(&out, &result)?;

        let filter = raw_path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(parse_name)
            .and_then(|name| name.filter)
            .unwrap_or_default();
        summary.bias_corrected.push(out.clone());
        corrected.push(CorrectedFile { path: out, filter });
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    // 4. Flat correction, grouped by filter
    reporter.begin_stage(ReductionStage::FlatCorrection, Some(corrected.len()));
    let mut final_paths: Vec<PathBuf> = Vec::new();
    for (i, file) in corrected.iter().enumerate() {
        let Some(flat) = flats.get(&file.filter) else {
            warn!(
                filter = %file.filter,
                path = %file.path.display(),
                "No flat for this filter, frame stays bias-corrected only"
            );
            reporter.advance(i + 1);
            continue;
        };
        let frame = read_fits(&file.path)?;
        let result = flat_correct(&frame, flat)?;
        let out = prefixed_path(&config.output_dir, "flatcorr", &file.path);
        write_fits(&out, &result)?;
        summary.flat_corrected.push(out.clone());
        final_paths.push(out);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    // 5. Reshape, when a target geometry is configured
    if let Some([h, w]) = config.reshape {
        reporter.begin_stage(ReductionStage::Reshaping, Some(final_paths.len()));
        let mut reshaped_paths = Vec::with_capacity(final_paths.len());
        for (i, path) in final_paths.iter().enumerate() {
            let frame = read_fits(path)?;
            let result = reshape(&frame, (h, w))?;
            let out = prefixed_path(&config.output_dir, "reshaped", path);
            write_fits(&out, &result)?;
            reshaped_paths.push(out);
            reporter.advance(i + 1);
        }
        summary.reshaped = reshaped_paths.clone();
        final_paths = reshaped_paths;
        reporter.finish_stage();
    }

    // 6. Cosmic-ray cleaning, when the capability was provided
    match cleaner {
        Some(cleaner) => {
            reporter.begin_stage(ReductionStage::CosmicRayCleaning, Some(final_paths.len()));
            for (i, path) in final_paths.iter().enumerate() {
                let frame = read_fits(path)?;
                let (mask, cleaned) =
                    cosmic_ray_clean(&frame, Some(cleaner.as_ref()), &config.cosmic_ray);
                let hits = mask.iter().filter(|&&m| m).count();
                info!(path = %path.display(), hits, "Cosmic rays removed");
                let out = prefixed_path(&config.output_dir, "crcorr", path);
                write_fits(&out, &cleaned)?;
                summary.cosmic_cleaned.push(out);
                reporter.advance(i + 1);
            }
            reporter.finish_stage();
        }
        None => {
            warn!("No cosmic-ray capability available, skipping cleaning");
        }
    }

    Ok(summary)
}

/// Run the full reduction without progress feedback.
pub fn run_reduction(
    config: &ReductionConfig,
    cleaner: Option<Arc<dyn CosmicRayCleaner>>,
) -> Result<ReductionSummary> {
    run_reduction_reported(config, cleaner, Arc::new(NoOpReporter))
}

fn load_frames(paths: &[PathBuf]) -> Result<Vec<Frame>> {
    paths.iter().map(|p| read_fits(p)).collect()
}

/// `dir/<prefix>_<filename of input>`.
fn prefixed_path(dir: &Path, prefix: &str, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{prefix}_{name}"))
}
