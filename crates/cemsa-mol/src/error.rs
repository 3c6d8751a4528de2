//! Error types for molecular operations

use thiserror::Error;

/// Errors that can occur when working with molecular data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MolError {
    /// Atom index is out of bounds
    #[error("Atom index {0} is out of bounds (atom count: {1})")]
    AtomIndexOutOfBounds(usize, usize),
}

/// Result type for molecular operations
pub type MolResult<T> = Result<T, MolError>;
