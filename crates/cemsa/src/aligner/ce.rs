//! In-process CE structural alignment
//!
//! C-alpha traces (one CA per residue, file order) go through Combinatorial
//! Extension; the residue pairs it returns are fitted with a single Kabsch
//! superposition, as `cmd.cealign` does, and the fit moves the whole mobile
//! molecule.

use cemsa_algos::{ce_align, superpose, CeParams as CeSearch, SuperposeParams};
use cemsa_mol::Molecule;

use super::{AlignOutcome, StructureAligner};
use crate::config::CeParams;
use crate::error::AlignerError;

/// Built-in CE aligner
#[derive(Debug, Clone)]
pub struct CeAligner {
    search: CeSearch,
    fit: SuperposeParams,
}

impl CeAligner {
    pub fn new(params: &CeParams) -> Self {
        Self {
            search: CeSearch {
                window: params.window as usize,
                gap_max: params.gap_max as usize,
                d0: params.d0,
                d1: params.d1,
                ..CeSearch::default()
            },
            // no outlier rejection: the RMSD covers every CE pair
            fit: SuperposeParams { cycles: 0, cutoff: 2.0 },
        }
    }
}

impl Default for CeAligner {
    fn default() -> Self {
        Self::new(&CeParams::default())
    }
}

fn ca_trace(molecule: &Molecule) -> Result<Vec<[f32; 3]>, AlignerError> {
    Ok(molecule.extract_coords(&molecule.ca_indices())?)
}

impl StructureAligner for CeAligner {
    fn name(&self) -> &str {
        "ce"
    }

    fn align(&self, reference: &Molecule, mobile: &Molecule) -> Result<AlignOutcome, AlignerError> {
        let ref_ca = ca_trace(reference)?;
        let mob_ca = ca_trace(mobile)?;
        if ref_ca.is_empty() || mob_ca.is_empty() {
            return Err(AlignerError::Unalignable(format!(
                "no C-alpha residues in '{}' or '{}'",
                reference.name, mobile.name
            )));
        }

        let ce = ce_align(&mob_ca, &ref_ca, &self.search)?;
        let fit = superpose(&mob_ca, &ref_ca, &ce.pairs, &self.fit)?;
        log::debug!(
            "{}: CE aligned {} of {}/{} residues, z-score {:.2}, RMSD {:.3}",
            mobile.name,
            ce.n_aligned(),
            mob_ca.len(),
            ref_ca.len(),
            ce.z_score,
            fit.final_rmsd
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
