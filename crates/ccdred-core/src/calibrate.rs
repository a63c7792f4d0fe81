use tracing::info;

use crate::combine::median_combine;
use crate::error::{CcdError, Result};
use crate::frame::Frame;
use crate::stats::{image_stats, ImageStats};

/// Build a master bias by median-combining the given bias frames.
///
/// Bias frames share exposure and offset level, so no per-frame
/// normalization is applied before stacking.
pub fn master_bias(frames: &[Frame]) -> Result<Frame> {
    let master = median_combine(frames, false)?;
    info!(frames = frames.len(), "Master bias combined");
    Ok(master)
}

/// Build a normalized flat field from the given flat frames.
///
/// Frames are scaled by their per-frame mode estimate before the median
/// combine, then the combined result is divided by its own median so
/// the final map is dimensionless with median ~1. The statistics of the
/// combined (pre-normalization) flat are returned for diagnostics.
pub fn normalized_flat(frames: &[Frame]) -> Result<(Frame, ImageStats)> {
    let combined = median_combine(frames, true)?;
    let stats = image_stats(&combined.data)?;

    if stats.median == 0.0 {
        return Err(CcdError::DivisionByZero(
            "combined flat has zero median".into(),
        ));
    }

    let mut flat = combined;
    flat.data /= stats.median;
    info!(frames = frames.len(), %stats, "Flat combined and normalized");
    Ok((flat, stats))
}
