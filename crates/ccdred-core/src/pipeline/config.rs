use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::post::CosmicRayParams;

/// Explicit configuration for one reduction run.
///
/// Everything the run needs is carried here; the pipeline never changes
/// the working directory or prompts for input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Directory holding the raw bias/flat/science frames.
    pub data_dir: PathBuf,
    /// Directory the calibrated products are written into.
    pub output_dir: PathBuf,
    /// Object name prefix of the science frames (e.g. "m31").
    pub object: String,
    /// Filters to reduce, matching the filter field of the filenames.
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,
    /// Target (height, width) for the reshape step; absent means the
    /// geometry is left alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reshape: Option<[usize; 2]>,
    /// Detector noise model for cosmic-ray cleaning.
    #[serde(default)]
    pub cosmic_ray: CosmicRayParams,
}

fn default_filters() -> Vec<String> {
    vec!["v".into(), "r".into(), "i".into()]
}

impl ReductionConfig {
    pub fn new(data_dir: PathBuf, output_dir: PathBuf, object: String) -> Self {
        Self {
            data_dir,
            output_dir,
            object,
            filters: default_filters(),
            reshape: None,
            cosmic_ray: CosmicRayParams::default(),
        }
    }
}
