use std::path::PathBuf;

/// Reduction stage, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum ReductionStage {
    MasterBias,
    MasterFlats,
    BiasCorrection,
    FlatCorrection,
    Reshaping,
    CosmicRayCleaning,
}

impl std::fmt::Display for ReductionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MasterBias => write!(f, "Combining bias frames"),
            Self::MasterFlats => write!(f, "Building flat fields"),
            Self::BiasCorrection => write!(f, "Subtracting bias"),
            Self::FlatCorrection => write!(f, "Dividing by flats"),
            Self::Reshaping => write!(f, "Reshaping"),
            Self::CosmicRayCleaning => write!(f, "Cleaning cosmic rays"),
        }
    }
}

/// Thread-safe progress reporting for the reduction.
///
/// Implementors can use this to drive progress bars, logging, or any
/// other UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new reduction stage has started. `total_items` is the number
    /// of work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: ReductionStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when no feedback is wanted.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Paths of everything a reduction run wrote.
#[derive(Clone, Debug, Default)]
pub struct ReductionSummary {
    pub master_bias: Option<PathBuf>,
    /// (filter, path) of each normalized flat that was built.
    pub flats: Vec<(String, PathBuf)>,
    pub bias_corrected: Vec<PathBuf>,
    pub flat_corrected: Vec<PathBuf>,
    pub reshaped: Vec<PathBuf>,
    pub cosmic_cleaned: Vec<PathBuf>,
}

impl ReductionSummary {
    /// The final science products: the furthest-processed set of files.
    pub fn final_products(&self) -> &[PathBuf] {
        if !self.cosmic_cleaned.is_empty() {
            &self.cosmic_cleaned
        } else if !self.reshaped.is_empty() {
            &self.reshaped
        } else if !self.flat_corrected.is_empty() {
            &self.flat_corrected
        } else {
            &self.bias_corrected
        }
    }
}
