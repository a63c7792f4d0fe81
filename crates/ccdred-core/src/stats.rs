use ndarray::Array2;

use crate::error::{CcdError, Result};

/// Summary statistics for one image array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageStats {
    pub mean: f64,
    pub median: f64,
    /// Modal value estimated as 3*median - 2*mean, valid for a
    /// near-Gaussian background distribution.
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub npix: usize,
}

impl std::fmt::Display for ImageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mean={:.4} median={:.4} mode={:.4} min={:.4} max={:.4} npix={}",
            self.mean, self.median, self.mode, self.min, self.max, self.npix
        )
    }
}

/// Compute summary statistics over all pixels of an image.
pub fn image_stats(data: &Array2<f64>) -> Result<ImageStats> {
    let npix = data.len();
    if npix == 0 {
        return Err(CcdError::EmptyInput);
    }

    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in data.iter() {
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    let mean = sum / npix as f64;

    let mut values: Vec<f64> = data.iter().copied().collect();
    let median = median_of(&mut values);

    Ok(ImageStats {
        mean,
        median,
        mode: 3.0 * median - 2.0 * mean,
        min,
        max,
        npix,
    })
}

/// Median of a slice, selecting in place without a full sort.
pub(crate) fn median_of(values: &mut [f64]) -> f64 {
    let n = values.len();
    debug_assert!(n > 0);
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}
