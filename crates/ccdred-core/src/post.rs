use ndarray::Array2;

use crate::consts::{DEFAULT_CR_GAIN, DEFAULT_CR_READNOISE, DEFAULT_CR_SIGCLIP, DEFAULT_CR_SIGFRAC};
use crate::error::{CcdError, Result};
use crate::frame::Frame;

/// Reinterpret a frame's geometry as `target` = (height, width).
///
/// Pure reshape: pixel values and their row-major order are unchanged.
/// Fails with `Reshape` when the pixel count does not match.
pub fn reshape(frame: &Frame, target: (usize, usize)) -> Result<Frame> {
    let (th, tw) = target;
    let pixels = frame.pixel_count();
    if pixels != th * tw {
        return Err(CcdError::Reshape {
            pixels,
            target_height: th,
            target_width: tw,
        });
    }

    let data = frame
        .data
        .clone()
        .into_shape_with_order((th, tw))
        .map_err(|_| CcdError::Reshape {
            pixels,
            target_height: th,
            target_width: tw,
        })?;
    Ok(Frame::with_header(data, frame.header.clone()))
}

/// Detector noise model and detection thresholds for cosmic-ray cleaning.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CosmicRayParams {
    /// CCD gain in e-/ADU.
    pub gain: f64,
    /// CCD read noise in e-.
    pub readnoise: f64,
    /// Laplacian sigma clipping threshold.
    pub sigclip: f64,
    /// Fractional detection threshold for pixels neighboring a hit.
    pub sigfrac: f64,
}

impl Default for CosmicRayParams {
    fn default() -> Self {
        Self {
            gain: DEFAULT_CR_GAIN,
            readnoise: DEFAULT_CR_READNOISE,
            sigclip: DEFAULT_CR_SIGCLIP,
            sigfrac: DEFAULT_CR_SIGFRAC,
        }
    }
}

/// External cosmic-ray detection capability.
///
/// The pipeline treats detection as opaque: given an image and the
/// detector noise model it returns a hit mask and a cleaned copy.
/// Implementations are injected at startup; when none was provided the
/// pipeline passes frames through unchanged instead of failing.
pub trait CosmicRayCleaner: Send + Sync {
    fn clean(
        &self,
        data: &Array2<f64>,
        params: &CosmicRayParams,
    ) -> (Array2<bool>, Array2<f64>);
}

/// Remove cosmic rays from a frame using the given cleaner, if any.
///
/// Returns the hit mask alongside the cleaned frame; with no cleaner
/// available the mask is empty (all false) and the frame is returned
/// unchanged.
pub fn cosmic_ray_clean(
    frame: &Frame,
    cleaner: Option<&dyn CosmicRayCleaner>,
    params: &CosmicRayParams,
) -> (Array2<bool>, Frame) {
    match cleaner {
        Some(cleaner) => {
            let (mask, cleaned) = cleaner.clean(&frame.data, params);
            (mask, Frame::with_header(cleaned, frame.header.clone()))
        }
        None => (
            Array2::from_elem(frame.data.dim(), false),
            frame.clone(),
        ),
    }
}
