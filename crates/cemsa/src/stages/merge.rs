//! Stage 3: merge pairwise alignments into one MSA
//!
//! Every pairwise file contributes its reference row and one target row. The
//! MSA is the first reference row, labelled `ref`, followed by each target in
//! the order it was first seen.

use std::path::{Path, PathBuf};

use cemsa_io::fasta::{read_fasta, write_fasta, FastaRecord};
use cemsa_session::REFERENCE_NAME;

use super::correspond::{ALIGNED_SUFFIX, REFERENCE_HEADER};
use super::list_files;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Why a pairwise FASTA file was not usable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairwiseFileError {
    #[error("missing 'ref_aligned' sequence")]
    MissingReference,

    #[error("expected exactly one target sequence, found {0:?}")]
    UnexpectedTargets(Vec<String>),
}

/// The two rows of a usable pairwise file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseEntry {
    pub reference: String,
    pub target_name: String,
    pub target: String,
}

/// Header -> sequence, keeping first-occurrence order.
///
/// A repeated header replaces the earlier sequence in place.
pub fn header_map(records: Vec<FastaRecord>) -> Vec<(String, String)> {
    let mut map: Vec<(String, String)> = Vec::with_capacity(records.len());
    for FastaRecord { header, sequence } in records {
        match map.iter_mut().find(|(h, _)| *h == header) {
            Some(entry) => entry.1 = sequence,
            None => map.push((header, sequence)),
        }
    }
    map
}

/// Target name for a pairwise header: a trailing `_aligned` is removed
pub fn target_name(header: &str) -> &str {
    header.strip_suffix(ALIGNED_SUFFIX).unwrap_or(header)
}

/// Check a pairwise file's records and pick out the reference and target rows
pub fn split_pairwise(records: Vec<FastaRecord>) -> Result<PairwiseEntry, PairwiseFileError> {
    let map = header_map(records);
    let reference = map
        .iter()
        .find(|(h, _)| h == REFERENCE_HEADER)
        .map(|(_, s)| s.clone())
        .ok_or(PairwiseFileError::MissingReference)?;

    let mut others: Vec<(String, String)> = map.into_iter().filter(|(h, _)| h != REFERENCE_HEADER).collect();
    if others.len() != 1 {
        return Err(PairwiseFileError::UnexpectedTargets(
            others.into_iter().map(|(h, _)| h).collect(),
        ));
    }
    let (header, target) = others.remove(0);

    Ok(PairwiseEntry {
        reference,
        target_name: target_name(&header).to_string(),
        target,
    })
}

/// Rows of the merged alignment and whether all reference rows agreed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msa {
    /// (name, sequence), `ref` first
    pub rows: Vec<(String, String)>,
    pub reference_consistent: bool,
}

impl Msa {
    pub fn to_records(&self) -> Vec<FastaRecord> {
        self.rows
            .iter()
            .map(|(name, seq)| FastaRecord::new(name.clone(), seq.clone()))
            .collect()
    }
}

/// Combine pairwise entries in file order; `None` when there are none
pub fn build_msa(entries: &[PairwiseEntry]) -> Option<Msa> {
    let first_reference = &entries.first()?.reference;
    let reference_consistent = entries.iter().all(|e| e.reference == *first_reference);
    if reference_consistent {
        log::info!("All reference sequences are identical");
    } else {
        log::warn!("Reference sequences differ between files; the aligned regions may cover different parts of the reference");
    }

    let mut targets: Vec<(String, String)> = Vec::new();
    for entry in entries {
        if entry.target_name == REFERENCE_NAME {
            log::warn!("Skipping target named '{}': the name is reserved for the reference row", REFERENCE_NAME);
            continue;
        }
        match targets.iter_mut().find(|(name, _)| *name == entry.target_name) {
            Some(row) => row.1 = entry.target.clone(),
            None => targets.push((entry.target_name.clone(), entry.target.clone())),
        }
    }

    let mut rows = Vec::with_capacity(targets.len() + 1);
    rows.push((REFERENCE_NAME.to_string(), first_reference.clone()));
    rows.extend(targets);

    let ref_len = first_reference.chars().count();
    let uneven: Vec<&str> = rows
        .iter()
        .filter(|(_, seq)| seq.chars().count() != ref_len)
        .map(|(name, _)| name.as_str())
        .collect();
    if !uneven.is_empty() {
        log::warn!(
            "Rows differ in length from the reference ({} residues): {}",
            ref_len,
            uneven.join(", ")
        );
    }

    Some(Msa {
        rows,
        reference_consistent,
    })
}

/// Summary of a stage 3 run
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub output: PathBuf,
    /// Number of target rows written (the reference row not counted)
    pub targets: usize,
    /// Pairwise files that were skipped
    pub rejected: Vec<PathBuf>,
    pub reference_consistent: bool,
}

fn read_pairwise(path: &Path) -> Option<PairwiseEntry> {
    let records = match read_fasta(path) {
        Ok(records) => records,
        Err(e) => {
            log::error!("Failed to parse {}: {}", path.display(), e);
            return None;
        }
    };
    match split_pairwise(records) {
        Ok(entry) => Some(entry),
        Err(e) => {
            log::error!("Unexpected layout in {}: {}", path.display(), e);
            None
        }
    }
}

/// Merge every pairwise FASTA file in the FASTA folder into the MSA file
pub fn merge_folder(config: &PipelineConfig) -> PipelineResult<MergeSummary> {
    log::info!("==== MSA generation started ====");
    let result = run(config);
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    log::info!("==== MSA generation finished ====");
    result
}

fn run(config: &PipelineConfig) -> PipelineResult<MergeSummary> {
    let suffix = config.fasta_suffix.as_str();
    let files = list_files(&config.fasta_dir, |name| name.ends_with(suffix))?;
    if files.is_empty() {
        return Err(PipelineError::NoAlignmentFiles {
            dir: config.fasta_dir.clone(),
            suffix: suffix.to_string(),
        });
    }

    let mut entries = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();
    for path in files {
        log::info!("Processing {}", path.display());
        match read_pairwise(&path) {
            Some(entry) => entries.push(entry),
            None => rejected.push(path),
        }
    }

    let msa = build_msa(&entries).ok_or_else(|| PipelineError::NoValidAlignments(config.fasta_dir.clone()))?;

    let output = &config.merge.output;
    write_fasta(output, &msa.to_records(), config.merge.line_width).map_err(|source| PipelineError::Write {
        path: output.clone(),
        source,
    })?;
    log::info!("Wrote MSA with {} sequences to {}", msa.rows.len(), output.display());

    Ok(MergeSummary {
        output: output.clone(),
        targets: msa.rows.len() - 1,
        rejected,
        reference_consistent: msa.reference_consistent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(header: &str, seq: &str) -> FastaRecord {
        FastaRecord::new(header, seq)
    }

    fn entry(reference: &str, name: &str, target: &str) -> PairwiseEntry {
        PairwiseEntry {
            reference: reference.to_string(),
            target_name: name.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_header_map_overwrites_in_place() {
        let map = header_map(vec![rec("a", "AA"), rec("b", "BB"), rec("a", "CC")]);
        assert_eq!(
            map,
            vec![("a".to_string(), "CC".to_string()), ("b".to_string(), "BB".to_string())]
        );
    }

    #[test]
    fn test_split_pairwise() {
        let entry = split_pairwise(vec![rec("ref_aligned", "ACD"), rec("t1_aligned", "ACE")]).unwrap();
        assert_eq!(entry.reference, "ACD");
        assert_eq!(entry.target_name, "t1");
        assert_eq!(entry.target, "ACE");

        // order of the two rows does not matter
        let entry = split_pairwise(vec![rec("t2_aligned", "GG"), rec("ref_aligned", "AA")]).unwrap();
        assert_eq!(entry.target_name, "t2");
    }

    #[test]
    fn test_split_pairwise_layout_errors() {
        assert_eq!(
            split_pairwise(vec![rec("t1_aligned", "A")]),
            Err(PairwiseFileError::MissingReference)
        );
        assert_eq!(
            split_pairwise(vec![rec("ref_aligned", "A"), rec("t1_aligned", "A"), rec("t2_aligned", "A")]),
            Err(PairwiseFileError::UnexpectedTargets(vec![
                "t1_aligned".to_string(),
                "t2_aligned".to_string()
            ]))
        );
        assert_eq!(
            split_pairwise(vec![rec("ref_aligned", "A")]),
            Err(PairwiseFileError::UnexpectedTargets(vec![]))
        );
        // a duplicate target header collapses to one entry
        assert!(split_pairwise(vec![rec("ref_aligned", "A"), rec("t1_aligned", "A"), rec("t1_aligned", "C")]).is_ok());
    }

    #[test]
    fn test_target_name_strips_suffix_only() {
        assert_eq!(target_name("t1_aligned"), "t1");
        assert_eq!(target_name("my_aligned_model_aligned"), "my_aligned_model");
        assert_eq!(target_name("unlabelled"), "unlabelled");
    }

    #[test]
    fn test_build_msa() {
        let msa = build_msa(&[entry("ACD", "t1", "ACE"), entry("ACD", "t2", "GCD")]).unwrap();
        assert!(msa.reference_consistent);
        assert_eq!(
            msa.rows,
            vec![
                ("ref".to_string(), "ACD".to_string()),
                ("t1".to_string(), "ACE".to_string()),
                ("t2".to_string(), "GCD".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_msa_uses_first_reference() {
        let msa = build_msa(&[entry("AAA", "t1", "AAA"), entry("CC", "t2", "CC")]).unwrap();
        assert!(!msa.reference_consistent);
        assert_eq!(msa.rows[0].1, "AAA");
    }

    #[test]
    fn test_build_msa_duplicate_and_reserved_names() {
        let msa = build_msa(&[
            entry("A", "t1", "X"),
            entry("A", "ref", "Q"),
            entry("A", "t2", "Y"),
            entry("A", "t1", "Z"),
        ])
        .unwrap();
        let names: Vec<&str> = msa.rows.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ref", "t1", "t2"]);
        assert_eq!(msa.rows[0].1, "A");
        assert_eq!(msa.rows[1].1, "Z");
    }

    #[test]
    fn test_build_msa_empty() {
        assert!(build_msa(&[]).is_none());
    }
}
