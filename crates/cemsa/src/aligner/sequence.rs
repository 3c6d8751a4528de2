//! Sequence-guided rigid-body alignment
//!
//! C-alpha sequences are aligned with Needleman-Wunsch, matched residues give
//! the CA pairs, and an iterative Kabsch fit over those pairs moves the whole
//! mobile molecule.

use cemsa_algos::{global_align, superpose, AlignmentScoring, SuperposeParams};
use cemsa_mol::Molecule;

use super::{AlignOutcome, StructureAligner};
use crate::error::AlignerError;

/// Built-in aligner; needs no external toolkit
#[derive(Debug, Clone, Default)]
pub struct SequenceAligner {
    scoring: AlignmentScoring,
    params: SuperposeParams,
}

impl SequenceAligner {
    pub fn new(cycles: u32, cutoff: f32) -> Self {
        Self {
            scoring: AlignmentScoring::default(),
            params: SuperposeParams { cycles, cutoff },
        }
    }
}

/// One-letter sequence and CA atom index of every residue that has a CA
fn ca_sequence(molecule: &Molecule) -> (Vec<char>, Vec<usize>) {
    molecule
        .residues()
        .filter_map(|residue| residue.ca().map(|ca| (residue.letter(), ca)))
        .unzip()
}

impl StructureAligner for SequenceAligner {
    fn name(&self) -> &str {
        "sequence"
    }

    fn align(&self, reference: &Molecule, mobile: &Molecule) -> Result<AlignOutcome, AlignerError> {
        let (ref_seq, ref_ca) = ca_sequence(reference);
        let (mob_seq, mob_ca) = ca_sequence(mobile);
        if ref_seq.is_empty() || mob_seq.is_empty() {
            return Err(AlignerError::Unalignable(format!(
                "no C-alpha residues in '{}' or '{}'",
                reference.name, mobile.name
            )));
        }

        let alignment = global_align(&mob_seq, &ref_seq, &self.scoring);
        let (mob_idx, ref_idx): (Vec<usize>, Vec<usize>) = alignment
            .matched_pairs()
            .into_iter()
            .map(|(m, r)| (mob_ca[m], ref_ca[r]))
            .unzip();

        let mob_coords = mobile.extract_coords(&mob_idx)?;
        let ref_coords = reference.extract_coords(&ref_idx)?;
        let pairs: Vec<(usize, usize)> = (0..mob_coords.len()).map(|i| (i, i)).collect();

        let fit = superpose(&mob_coords, &ref_coords, &pairs, &self.params)?;
        log::debug!(
            "{}: {} CA pairs, identity {:.1}%, RMSD {:.3} -> {:.3} after {} cycles",
            mobile.name,
            pairs.len(),
            alignment.identity * 100.0,
            fit.initial_rmsd,
            fit.final_rmsd,
            fit.cycles_performed
        );

        let mut aligned = mobile.clone();
        aligned.transform(&fit.transform.to_mat4());

        Ok(AlignOutcome {
            aligned,
            rmsd: Some(fit.final_rmsd),
            aligned_length: Some(fit.n_aligned),
        })
    }
}
