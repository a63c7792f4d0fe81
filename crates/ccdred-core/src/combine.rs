use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{CcdError, Result};
use crate::frame::Frame;
use crate::stats::{image_stats, median_of};

/// Combine frames by taking the median at each pixel position.
///
/// The per-pixel median is robust to outliers (cosmic rays, satellite
/// trails) present in only a minority of frames. With `scale_by_mode`,
/// each frame is first divided by its own mode estimate
/// (3*median - 2*mean) to equalize illumination level across exposures;
/// a frame whose estimate is exactly zero is stacked unscaled.
///
/// Fails with `EmptyInput` for an empty list and `ShapeMismatch` when
/// the frames do not all share the same dimensions. The output shape
/// equals the input shape; the first frame's header is carried over.
pub fn median_combine(frames: &[Frame], scale_by_mode: bool) -> Result<Frame> {
    if frames.is_empty() {
        return Err(CcdError::EmptyInput);
    }

    let (h, w) = frames[0].data.dim();
    for frame in &frames[1..] {
        let (fh, fw) = frame.data.dim();
        if (fh, fw) != (h, w) {
            return Err(CcdError::ShapeMismatch {
                expected_height: h,
                expected_width: w,
                height: fh,
                width: fw,
            });
        }
    }

    let scaled: Vec<Array2<f64>> = if scale_by_mode {
        frames
            .iter()
            .map(|frame| {
                let stats = image_stats(&frame.data)?;
                if stats.mode != 0.0 {
                    debug!(mode = stats.mode, "Scaling frame by mode estimate");
                    Ok(&frame.data / stats.mode)
                } else {
                    Ok(frame.data.clone())
                }
            })
            .collect::<Result<_>>()?
    } else {
        frames.iter().map(|frame| frame.data.clone()).collect()
    };

    let data = stack_median(&scaled, h, w);
    Ok(Frame::with_header(data, frames[0].header.clone()))
}

/// Elementwise median across same-shape arrays.
fn stack_median(arrays: &[Array2<f64>], h: usize, w: usize) -> Array2<f64> {
    let n = arrays.len();

    if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        // Row-parallel: each row allocates its own pixel_values
        let rows: Vec<Vec<f64>> = (0..h)
            .into_par_iter()
            .map(|row| {
                let mut pixel_values = vec![0.0f64; n];
                let mut row_result = vec![0.0f64; w];
                for (col, result) in row_result.iter_mut().enumerate() {
                    for (i, array) in arrays.iter().enumerate() {
                        pixel_values[i] = array[[row, col]];
                    }
                    *result = median_of(&mut pixel_values);
                }
                row_result
            })
            .collect();

        let mut result = Array2::<f64>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        result
    } else {
        // Sequential for small images
        let mut result = Array2::<f64>::zeros((h, w));
        let mut pixel_values = vec![0.0f64; n];

        for row in 0..h {
            for col in 0..w {
                for (i, array) in arrays.iter().enumerate() {
                    pixel_values[i] = array[[row, col]];
                }
                result[[row, col]] = median_of(&mut pixel_values);
            }
        }
        result
    }
}
