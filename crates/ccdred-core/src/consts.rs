/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// FITS record unit: headers and data are padded to this block size.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// Length of one FITS header card.
pub const FITS_CARD_SIZE: usize = 80;

/// Default CCD gain (e-/ADU) for cosmic-ray detection.
pub const DEFAULT_CR_GAIN: f64 = 1.0;

/// Default CCD read noise (e-) for cosmic-ray detection.
pub const DEFAULT_CR_READNOISE: f64 = 5.0;

/// Default Laplacian sigma clipping threshold for cosmic-ray detection.
pub const DEFAULT_CR_SIGCLIP: f64 = 4.5;

/// Default fractional detection threshold for neighboring pixels.
pub const DEFAULT_CR_SIGFRAC: f64 = 0.3;
