/// Mean frequency a contact must exceed to be kept
pub const DEFAULT_CUTOFF: f64 = 0.1;

/// Minimum sequence separation of a contact kept by the labeling step
pub const DEFAULT_MIN_RESIDUE_SEPARATION: u32 = 4;

/// Settings of the merge pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Rows with `freq_avg <= cutoff` are dropped
    pub cutoff: f64,
    /// Sort the result by descending `freq_avg`
    pub sort: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            sort: false,
        }
    }
}

/// Settings of the labeling step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelConfig {
    /// Contacts between residues closer than this in sequence are dropped
    pub min_residue_separation: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min_residue_separation: DEFAULT_MIN_RESIDUE_SEPARATION,
        }
    }
}
