//! Pipeline configuration
//!
//! Every field has a default matching the conventional working-directory
//! layout (`pdbs/ref.pdb`, `alignment.prs`, `aligned.msa.fasta`). A JSON file
//! may override any subset of fields; command-line flags are applied last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Which structure aligner stage 1 uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlignerBackend {
    /// Built-in Combinatorial Extension alignment
    #[default]
    Ce,
    /// Built-in sequence-guided rigid-body fit
    Sequence,
    /// CE alignment through an external PyMOL executable
    Pymol,
}

impl std::fmt::Display for AlignerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignerBackend::Ce => f.write_str("ce"),
            AlignerBackend::Sequence => f.write_str("sequence"),
            AlignerBackend::Pymol => f.write_str("pymol"),
        }
    }
}

/// CE parameters, used by the `ce` backend and handed to `cmd.cealign` by
/// the `pymol` backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeParams {
    pub d0: f32,
    pub d1: f32,
    pub window: u32,
    pub gap_max: u32,
}

impl Default for CeParams {
    fn default() -> Self {
        Self {
            d0: 3.0,
            d1: 4.0,
            window: 8,
            gap_max: 30,
        }
    }
}

/// Stage 1: structural alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Folder holding the reference and target structures
    pub pdb_dir: PathBuf,
    /// File name of the reference inside `pdb_dir`
    pub reference_file: String,
    pub backend: AlignerBackend,
    /// PyMOL executable for the `pymol` backend
    pub pymol_executable: PathBuf,
    pub ce: CeParams,
    /// Outlier rejection cycles for the `sequence` backend
    pub cycles: u32,
    /// Outlier cutoff (in units of the current RMSD) for the `sequence` backend
    pub cutoff: f32,
    /// Also write every aligned target as `<name>_aligned.pdb`
    pub export_aligned: bool,
    pub export_dir: PathBuf,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            pdb_dir: PathBuf::from("pdbs"),
            reference_file: "ref.pdb".to_string(),
            backend: AlignerBackend::default(),
            pymol_executable: PathBuf::from("pymol"),
            ce: CeParams::default(),
            cycles: 5,
            cutoff: 2.0,
            export_aligned: false,
            export_dir: PathBuf::from("aligned"),
        }
    }
}

impl AlignConfig {
    pub fn reference_path(&self) -> PathBuf {
        self.pdb_dir.join(&self.reference_file)
    }
}

/// Stage 2: CA correspondence extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// CA proximity threshold in Å
    pub threshold: f32,
    /// Extract targets whose structural alignment failed as well
    pub include_unaligned: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            include_unaligned: false,
        }
    }
}

/// Stage 3: MSA assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub output: PathBuf,
    /// FASTA line width, 0 for one line per sequence
    pub line_width: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("aligned.msa.fasta"),
            line_width: 0,
        }
    }
}

/// Configuration for all three stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Session written by stage 1 and read by stage 2
    pub session: PathBuf,
    /// Folder for the pairwise FASTA files (written by stage 2, read by stage 3)
    pub fasta_dir: PathBuf,
    /// File name suffix of the pairwise FASTA files
    pub fasta_suffix: String,
    pub align: AlignConfig,
    pub extract: ExtractConfig,
    pub merge: MergeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            session: PathBuf::from("alignment.prs"),
            fasta_dir: PathBuf::from("."),
            fasta_suffix: "_seq_align.fasta".to_string(),
            align: AlignConfig::default(),
            extract: ExtractConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the pairwise FASTA file for a target
    pub fn pairwise_fasta_path(&self, target: &str) -> PathBuf {
        self.fasta_dir.join(format!("{}{}", target, self.fasta_suffix))
    }

    /// Reject values no stage can work with
    pub fn validate(&self) -> PipelineResult<()> {
        let threshold = self.extract.threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "distance threshold must be a positive number, got {}",
                threshold
            )));
        }
        if self.fasta_suffix.is_empty() {
            return Err(PipelineError::InvalidConfig("FASTA suffix must not be empty".to_string()));
        }
        if self.align.reference_file.is_empty() {
            return Err(PipelineError::InvalidConfig("reference file name must not be empty".to_string()));
        }
        let ce = &self.align.ce;
        if ce.window < 3 {
            return Err(PipelineError::InvalidConfig(format!(
                "CE window must be at least 3 residues, got {}",
                ce.window
            )));
        }
        if !(ce.d0 > 0.0 && ce.d1 > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "CE cutoffs must be positive, got d0 = {}, d1 = {}",
                ce.d0, ce.d1
            )));
        }
        if self.align.cutoff.is_nan() || self.align.cutoff <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "outlier cutoff must be positive, got {}",
                self.align.cutoff
            )));
        }
        Ok(())
    }
}
