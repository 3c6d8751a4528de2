//! Error types for aligners and pipeline stages

use std::path::PathBuf;

use cemsa_algos::AlignError;
use cemsa_io::IoError;
use cemsa_mol::MolError;
use cemsa_session::SessionError;

/// Errors raised by a structure aligner backend
#[derive(Debug, thiserror::Error)]
pub enum AlignerError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {message}")]
    ExternalFailed {
        program: String,
        status: String,
        message: String,
    },

    #[error("aligner produced no structure at {0}")]
    MissingOutput(PathBuf),

    #[error("{0}")]
    Unalignable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Structure(#[from] IoError),

    #[error(transparent)]
    Fit(#[from] AlignError),

    #[error(transparent)]
    Molecule(#[from] MolError),
}

/// Errors from pairing C-alpha atoms of two superposed structures
#[derive(Debug, thiserror::Error)]
pub enum CorrespondError {
    #[error(
        "no CA atoms in aligned region ({reference_count} in reference, {target_count} in target)"
    )]
    NoAlignedRegion {
        reference_count: usize,
        target_count: usize,
    },

    #[error("invalid distance threshold {0}")]
    InvalidThreshold(f32),
}

/// Fatal pipeline errors; each stops the current stage
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("reference structure {0} does not exist")]
    MissingReference(PathBuf),

    #[error("failed to load reference structure {path}: {source}")]
    LoadReference {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("no .pdb files other than {reference} found in {dir}")]
    NoTargets { dir: PathBuf, reference: String },

    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save session {path}: {source}")]
    SaveSession {
        path: PathBuf,
        #[source]
        source: SessionError,
    },

    #[error("failed to load session {path}: {source}")]
    LoadSession {
        path: PathBuf,
        #[source]
        source: SessionError,
    },

    #[error("session {0} contains no target objects")]
    EmptySession(PathBuf),

    #[error("no *{suffix} files found in {dir}")]
    NoAlignmentFiles { dir: PathBuf, suffix: String },

    #[error("no valid pairwise alignment files in {0}")]
    NoValidAlignments(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
