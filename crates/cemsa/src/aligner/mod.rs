//! Structure aligner backends
//!
//! Stage 1 only needs "move this molecule onto the reference and tell me the
//! RMSD"; [`StructureAligner`] is that seam.
//!
//! - [`CeAligner`] - built-in Combinatorial Extension (the default)
//! - [`PymolCeAligner`] - CE alignment through an external PyMOL process
//! - [`SequenceAligner`] - built-in sequence-guided Kabsch fit

mod ce;
mod pymol;
mod sequence;

pub use ce::CeAligner;
pub use pymol::PymolCeAligner;
pub use sequence::SequenceAligner;

use cemsa_mol::Molecule;

use crate::config::{AlignConfig, AlignerBackend};
use crate::error::AlignerError;

/// Result of aligning a mobile structure onto the reference
#[derive(Debug, Clone)]
pub struct AlignOutcome {
    /// The mobile molecule in the reference frame
    pub aligned: Molecule,
    /// RMSD in Å, `None` when the backend reported none
    pub rmsd: Option<f32>,
    /// Number of aligned residues, when known
    pub aligned_length: Option<usize>,
}

/// A method for superposing one structure onto another
pub trait StructureAligner {
    /// Method name recorded in the session
    fn name(&self) -> &str;

    /// Superpose `mobile` onto `reference`; neither input is modified
    fn align(&self, reference: &Molecule, mobile: &Molecule) -> Result<AlignOutcome, AlignerError>;
}

/// Build the aligner selected in the configuration
pub fn from_config(config: &AlignConfig) -> Box<dyn StructureAligner> {
    match config.backend {
        AlignerBackend::Ce => Box::new(CeAligner::new(&config.ce)),
        AlignerBackend::Sequence => Box::new(SequenceAligner::new(config.cycles, config.cutoff)),
        AlignerBackend::Pymol => Box::new(PymolCeAligner::new(&config.pymol_executable, config.ce.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_backend() {
        let mut config = AlignConfig::default();
        assert_eq!(from_config(&config).name(), "ce");
        config.backend = AlignerBackend::Sequence;
        assert_eq!(from_config(&config).name(), "sequence");
        config.backend = AlignerBackend::Pymol;
        assert_eq!(from_config(&config).name(), "cealign");
    }
}
