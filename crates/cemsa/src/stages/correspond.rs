//! Stage 2: residue correspondences from superposed structures
//!
//! After superposition, C-alpha atoms of the reference lying within a small
//! distance of the target (and vice versa) mark the structurally aligned
//! region. Both sets are put in sequence order and paired index by index.

use std::path::PathBuf;

use cemsa_io::fasta::{write_fasta, FastaRecord};
use cemsa_mol::{ca_within, residue_letter, Atom, Molecule};
use cemsa_session::load_session;

use crate::config::PipelineConfig;
use crate::error::{CorrespondError, PipelineError, PipelineResult};

/// Header of the reference row in pairwise FASTA files
pub const REFERENCE_HEADER: &str = "ref_aligned";
/// Suffix appended to the target name in pairwise FASTA headers
pub const ALIGNED_SUFFIX: &str = "_aligned";

/// Equal-length residue strings for the aligned region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseAlignment {
    pub reference: String,
    pub target: String,
}

impl PairwiseAlignment {
    pub fn len(&self) -> usize {
        self.reference.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// The two FASTA records: `ref_aligned`, then `<target>_aligned`
    pub fn to_records(&self, target_name: &str) -> [FastaRecord; 2] {
        [
            FastaRecord::new(REFERENCE_HEADER, self.reference.clone()),
            FastaRecord::new(format!("{}{}", target_name, ALIGNED_SUFFIX), self.target.clone()),
        ]
    }
}

/// Atoms for `indices`, ordered by chain, residue number and insertion code
fn sequence_ordered<'a>(molecule: &'a Molecule, indices: &[usize]) -> Vec<&'a Atom> {
    let mut atoms: Vec<&Atom> = indices.iter().filter_map(|&i| molecule.get_atom(i)).collect();
    atoms.sort_by(|a, b| a.residue_key().sequence_order(&b.residue_key()));
    atoms
}

/// Pair the C-alpha atoms of the aligned region of two superposed molecules.
///
/// When the two selections differ in size the shorter one bounds the
/// pairing and a warning is logged.
pub fn extract_sequence_alignment(
    reference: &Molecule,
    target: &Molecule,
    threshold: f32,
) -> Result<PairwiseAlignment, CorrespondError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(CorrespondError::InvalidThreshold(threshold));
    }

    log::info!(
        "Selections for {}: '{} and name CA within {:.1} of {}' and '{} and name CA within {:.1} of {}'",
        target.name,
        reference.name,
        threshold,
        target.name,
        target.name,
        threshold,
        reference.name
    );

    let ref_atoms = sequence_ordered(reference, &ca_within(reference, target, threshold));
    let target_atoms = sequence_ordered(target, &ca_within(target, reference, threshold));

    if ref_atoms.is_empty() || target_atoms.is_empty() {
        return Err(CorrespondError::NoAlignedRegion {
            reference_count: ref_atoms.len(),
            target_count: target_atoms.len(),
        });
    }

    if ref_atoms.len() != target_atoms.len() {
        log::warn!(
            "Aligned CA count mismatch for {}: ref={} vs {}={}; pairing the first {}",
            target.name,
            ref_atoms.len(),
            target.name,
            target_atoms.len(),
            ref_atoms.len().min(target_atoms.len())
        );
    }

    let (reference_seq, target_seq): (String, String) = ref_atoms
        .iter()
        .zip(&target_atoms)
        .map(|(r, t)| (residue_letter(&r.resn), residue_letter(&t.resn)))
        .unzip();

    let alignment = PairwiseAlignment {
        reference: reference_seq,
        target: target_seq,
    };
    log::info!("{}: extracted {} aligned residues", target.name, alignment.len());
    Ok(alignment)
}

/// Summary of a stage 2 run
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Pairwise FASTA files written
    pub written: Vec<PathBuf>,
    /// Targets skipped because their structural alignment failed
    pub skipped: Vec<String>,
    /// Targets whose extraction or write failed
    pub failed: Vec<String>,
}

/// Write a pairwise FASTA file for every target in the session
pub fn extract_folder(config: &PipelineConfig) -> PipelineResult<ExtractSummary> {
    log::info!("==== Sequence correspondence extraction started ====");
    let result = run(config);
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    log::info!("==== Sequence correspondence extraction finished ====");
    result
}

fn run(config: &PipelineConfig) -> PipelineResult<ExtractSummary> {
    log::info!("Loading session {}", config.session.display());
    let session = load_session(&config.session).map_err(|source| PipelineError::LoadSession {
        path: config.session.clone(),
        source,
    })?;
    if session.targets.is_empty() {
        return Err(PipelineError::EmptySession(config.session.clone()));
    }

    if let Err(e) = std::fs::create_dir_all(&config.fasta_dir) {
        log::warn!("Cannot create {}: {}", config.fasta_dir.display(), e);
    }

    if !config.extract.include_unaligned {
        log::info!(
            "Targets whose structural alignment failed are skipped; \
             set include_unaligned to extract them from their input coordinates"
        );
    }

    let mut summary = ExtractSummary::default();
    for target in &session.targets {
        let name = target.name();
        if !target.record.status.is_aligned() && !config.extract.include_unaligned {
            log::warn!("Skipping {}: structural alignment failed (include_unaligned is off)", name);
            summary.skipped.push(name.to_string());
            continue;
        }

        log::info!("Processing target {}", name);
        let alignment =
            match extract_sequence_alignment(&session.reference, &target.molecule, config.extract.threshold) {
                Ok(alignment) => alignment,
                Err(e) => {
                    log::error!("Sequence extraction for {} failed: {}", name, e);
                    summary.failed.push(name.to_string());
                    continue;
                }
            };

        let path = config.pairwise_fasta_path(name);
        match write_fasta(&path, &alignment.to_records(name), 0) {
            Ok(()) => {
                log::info!("Wrote {}", path.display());
                summary.written.push(path);
            }
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                summary.failed.push(name.to_string());
            }
        }
    }

    if !summary.skipped.is_empty() {
        log::warn!(
            "{} unaligned target(s) left out of extraction: {}",
            summary.skipped.len(),
            summary.skipped.join(", ")
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cemsa_mol::Element;
    use lin_alg::f32::Vec3;

    fn chain(name: &str, residues: &[(&str, i32, f32)], y: f32) -> Molecule {
        let mut mol = Molecule::new(name);
        for &(resn, resv, x) in residues {
            mol.add_atom(
                Atom::new("N", Element::Nitrogen).with_residue(resn, resv, "A"),
                Vec3::new(x - 1.0, y + 5.0, 0.0),
            );
            mol.add_atom(
                Atom::new("CA", Element::Carbon).with_residue(resn, resv, "A"),
                Vec3::new(x, y, 0.0),
            );
        }
        mol
    }

    #[test]
    fn test_pairs_proximal_residues() {
        let reference = chain("ref", &[("ALA", 1, 0.0), ("GLY", 2, 3.8), ("SER", 3, 7.6), ("LYS", 4, 30.0)], 0.0);
        let target = chain("t1", &[("ALA", 10, 0.0), ("GLY", 11, 3.8), ("THR", 12, 7.6)], 0.5);

        let alignment = extract_sequence_alignment(&reference, &target, 2.0).unwrap();
        assert_eq!(alignment.reference, "AGS");
        assert_eq!(alignment.target, "AGT");
        assert_eq!(alignment.len(), 3);
    }

    #[test]
    fn test_unknown_residue_maps_to_x() {
        let reference = chain("ref", &[("MSE", 1, 0.0), ("ALA", 2, 3.8)], 0.0);
        let target = chain("t1", &[("MET", 1, 0.0), ("HYP", 2, 3.8)], 0.0);

        let alignment = extract_sequence_alignment(&reference, &target, 2.0).unwrap();
        assert_eq!(alignment.reference, "XA");
        assert_eq!(alignment.target, "MX");
    }

    #[test]
    fn test_sorted_by_residue_number() {
        // file order is not sequence order
        let reference = chain("ref", &[("GLY", 2, 3.8), ("ALA", 1, 0.0)], 0.0);
        let target = chain("t1", &[("TRP", 8, 0.0), ("TYR", 9, 3.8)], 0.0);

        let alignment = extract_sequence_alignment(&reference, &target, 2.0).unwrap();
        assert_eq!(alignment.reference, "AG");
        assert_eq!(alignment.target, "WY");
    }

    fn ca_at(resn: &str, resv: i32, inscode: char, chain: &str, x: f32) -> (Atom, Vec3) {
        let mut atom = Atom::new("CA", Element::Carbon).with_residue(resn, resv, chain);
        atom.inscode = inscode;
        (atom, Vec3::new(x, 0.0, 0.0))
    }

    fn molecule(name: &str, atoms: Vec<(Atom, Vec3)>) -> Molecule {
        let mut mol = Molecule::new(name);
        for (atom, coord) in atoms {
            mol.add_atom(atom, coord);
        }
        mol
    }

    #[test]
    fn test_sorted_by_chain_then_insertion_code() {
        // chain B comes first in both files; chain A of the reference is
        // written 53, 52, 52A
        let reference = molecule(
            "ref",
            vec![
                ca_at("LYS", 1, ' ', "B", 20.0),
                ca_at("ARG", 2, ' ', "B", 23.8),
                ca_at("SER", 53, ' ', "A", 7.6),
                ca_at("ALA", 52, ' ', "A", 0.0),
                ca_at("GLY", 52, 'A', "A", 3.8),
            ],
        );
        let target = molecule(
            "t1",
            vec![
                ca_at("HIS", 1, ' ', "B", 20.0),
                ca_at("PHE", 2, ' ', "B", 23.8),
                ca_at("VAL", 1, ' ', "A", 0.0),
                ca_at("TRP", 2, ' ', "A", 3.8),
                ca_at("TYR", 3, ' ', "A", 7.6),
            ],
        );

        let alignment = extract_sequence_alignment(&reference, &target, 2.0).unwrap();
        assert_eq!(alignment.reference, "AGSKR");
        assert_eq!(alignment.target, "VWYHF");
    }

    #[test]
    fn test_mismatched_counts_pair_the_shorter() {
        let reference = chain("ref", &[("ALA", 1, 0.0), ("GLY", 2, 3.8), ("SER", 3, 7.6)], 0.0);
        // one target CA sits between two reference CAs, so both are selected
        let target = chain("t1", &[("VAL", 1, 1.9)], 0.0);

        let alignment = extract_sequence_alignment(&reference, &target, 2.0).unwrap();
        assert_eq!(alignment.reference, "A");
        assert_eq!(alignment.target, "V");
    }

    #[test]
    fn test_no_aligned_region() {
        let reference = chain("ref", &[("ALA", 1, 0.0)], 0.0);
        let target = chain("t1", &[("ALA", 1, 0.0)], 50.0);

        let err = extract_sequence_alignment(&reference, &target, 2.0).unwrap_err();
        assert!(matches!(
            err,
            CorrespondError::NoAlignedRegion {
                reference_count: 0,
                target_count: 0
            }
        ));
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        let reference = chain("ref", &[("ALA", 1, 0.0)], 0.0);
        assert!(matches!(
            extract_sequence_alignment(&reference, &reference, -1.0),
            Err(CorrespondError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_records() {
        let alignment = PairwiseAlignment {
            reference: "AG".to_string(),
            target: "AS".to_string(),
        };
        let [first, second] = alignment.to_records("t1");
        assert_eq!(first, FastaRecord::new("ref_aligned", "AG"));
        assert_eq!(second, FastaRecord::new("t1_aligned", "AS"));
    }
}
