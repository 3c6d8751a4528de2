//! Structure-guided multiple sequence alignment
//!
//! A three-stage batch pipeline over a folder of PDB structures:
//!
//! 1. [`stages::ce_align`] superposes every target onto a reference and saves
//!    an alignment session
//! 2. [`stages::correspond`] pairs C-alpha atoms that sit close together after
//!    superposition and writes one pairwise FASTA file per target
//! 3. [`stages::merge`] combines the pairwise files into `aligned.msa.fasta`
//!
//! ```no_run
//! use cemsa::{aligner, stages, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let backend = aligner::from_config(&config.align);
//! stages::ce_align::align_folder(&config, backend.as_ref())?;
//! stages::correspond::extract_folder(&config)?;
//! stages::merge::merge_folder(&config)?;
//! # Ok::<(), cemsa::PipelineError>(())
//! ```

pub mod aligner;
pub mod config;
pub mod error;
pub mod logging;
pub mod stages;

pub use aligner::{AlignOutcome, CeAligner, PymolCeAligner, SequenceAligner, StructureAligner};
pub use config::{AlignConfig, AlignerBackend, CeParams, ExtractConfig, MergeConfig, PipelineConfig};
pub use error::{AlignerError, CorrespondError, PipelineError, PipelineResult};
