//! Error type for alignment algorithms

/// Errors from alignment algorithms
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error("Coordinate arrays have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("Not enough atoms for alignment (need at least 3, got {0})")]
    TooFewAtoms(usize),

    #[error("Weights must sum to a positive value")]
    InvalidWeights,

    #[error("CE window must be at least 3 residues, got {0}")]
    InvalidWindow(usize),

    #[error("Pair ({0}, {1}) refers to a missing coordinate")]
    PairOutOfRange(usize, usize),

    #[error("No matching residues found between structures")]
    NoMatches,

    #[error("All pairs rejected as outliers")]
    AllRejected,
}
