//! Computational algorithms for the cemsa pipeline
//!
//! - Analytical 3×3 SVD ([`linalg::svd3`])
//! - Kabsch algorithm for optimal rigid-body superposition
//! - Combinatorial Extension (CE) structural alignment of C-alpha traces
//! - Needleman-Wunsch global sequence alignment (BLOSUM62, affine gaps)
//! - Iterative superposition with outlier rejection

mod ce;
mod error;
mod kabsch;
pub mod linalg;
mod sequence_align;
mod substitution_matrix;
mod superpose;

pub use ce::{ce_align, CeParams, CeResult};
pub use error::AlignError;
pub use kabsch::{kabsch, KabschResult};
pub use sequence_align::{global_align, AlignedPair, AlignmentResult, AlignmentScoring};
pub use substitution_matrix::{SubstitutionMatrix, BLOSUM62, IDENTITY};
pub use superpose::{superpose, SuperposeParams, SuperposeResult};
