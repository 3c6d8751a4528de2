//! Stage 1: batch structural alignment onto a reference

use std::path::{Path, PathBuf};

use cemsa_io::pdb::{read_pdb, write_pdb};
use cemsa_session::{save_session, AlignmentRecord, AlignmentSession, REFERENCE_NAME};

use super::list_files;
use crate::aligner::StructureAligner;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

const PDB_EXTENSIONS: [&str; 2] = [".pdb.gz", ".pdb"];

/// Object name for a structure file: the file name without `.pdb`/`.pdb.gz`
pub fn object_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    PDB_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .map(str::to_string)
        .unwrap_or(file_name)
}

fn is_structure_file(name: &str) -> bool {
    PDB_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// How one target fared
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutcome {
    Aligned { rmsd: Option<f32> },
    /// Alignment failed; the target is in the session with its input coordinates
    Failed(String),
    /// Could not be loaded; not in the session
    Skipped(String),
}

/// Summary of a stage 1 run
#[derive(Debug, Clone)]
pub struct AlignSummary {
    pub session: PathBuf,
    /// (object name, outcome) per target file, in processing order
    pub targets: Vec<(String, TargetOutcome)>,
    /// Aligned PDB files written when export is enabled
    pub exported: Vec<PathBuf>,
}

impl AlignSummary {
    pub fn aligned_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|(_, o)| matches!(o, TargetOutcome::Aligned { .. }))
            .count()
    }
}

fn format_rmsd(rmsd: Option<f32>) -> String {
    match rmsd {
        Some(value) => format!("{:.3}", value),
        None => "N/A".to_string(),
    }
}

/// Align every structure in the PDB folder onto the reference and save the session
pub fn align_folder(config: &PipelineConfig, aligner: &dyn StructureAligner) -> PipelineResult<AlignSummary> {
    log::info!("==== CE alignment started ====");
    let result = run(config, aligner);
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    log::info!("==== CE alignment finished ====");
    result
}

fn run(config: &PipelineConfig, aligner: &dyn StructureAligner) -> PipelineResult<AlignSummary> {
    let align = &config.align;
    let ref_path = align.reference_path();
    if !ref_path.exists() {
        return Err(PipelineError::MissingReference(ref_path));
    }

    let target_files = list_files(&align.pdb_dir, |name| {
        is_structure_file(name) && name != align.reference_file
    })?;
    if target_files.is_empty() {
        return Err(PipelineError::NoTargets {
            dir: align.pdb_dir.clone(),
            reference: align.reference_file.clone(),
        });
    }

    log::info!("Loading reference structure: {}", ref_path.display());
    let reference = read_pdb(&ref_path).map_err(|source| PipelineError::LoadReference {
        path: ref_path.clone(),
        source,
    })?;
    let mut session = AlignmentSession::new(reference);
    let mut targets = Vec::with_capacity(target_files.len());

    for path in &target_files {
        let name = object_name(path);
        if name == REFERENCE_NAME {
            log::warn!("Skipping {}: object name '{}' is reserved for the reference", path.display(), name);
            targets.push((name, TargetOutcome::Skipped("reserved object name".to_string())));
            continue;
        }
        if let Some(existing) = session.get_target(&name) {
            let first = existing
                .molecule
                .source
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            log::warn!(
                "Skipping {}: object name '{}' already taken by {}",
                path.display(),
                name,
                first
            );
            targets.push((name, TargetOutcome::Skipped("duplicate object name".to_string())));
            continue;
        }

        log::info!("Loading target structure: {}", path.display());
        let mut molecule = match read_pdb(path) {
            Ok(mol) => mol,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                targets.push((name, TargetOutcome::Skipped(e.to_string())));
                continue;
            }
        };
        molecule.name = name.clone();

        log::info!("Running {} alignment: reference '{}' with '{}'", aligner.name(), REFERENCE_NAME, name);
        match aligner.align(&session.reference, &molecule) {
            Ok(outcome) => {
                log::info!("Alignment result {}: RMSD = {}", name, format_rmsd(outcome.rmsd));
                let record = AlignmentRecord::aligned(aligner.name(), outcome.rmsd, outcome.aligned_length);
                let mut aligned = outcome.aligned;
                aligned.name = name.clone();
                session.add_target(aligned, record);
                targets.push((name, TargetOutcome::Aligned { rmsd: outcome.rmsd }));
            }
            Err(e) => {
                log::error!("Alignment of {} failed: {}", name, e);
                session.add_target(molecule, AlignmentRecord::failed(aligner.name(), e.to_string()));
                targets.push((name, TargetOutcome::Failed(e.to_string())));
            }
        }
    }

    log::info!("Saving session to {}", config.session.display());
    save_session(&session, &config.session).map_err(|source| PipelineError::SaveSession {
        path: config.session.clone(),
        source,
    })?;

    let exported = if align.export_aligned {
        export_aligned(&session, &align.export_dir)
    } else {
        Vec::new()
    };

    log::info!(
        "{} of {} targets aligned ({} in session)",
        session.aligned_count(),
        target_files.len(),
        session.targets.len()
    );

    Ok(AlignSummary {
        session: config.session.clone(),
        targets,
        exported,
    })
}

/// Write `<name>_aligned.pdb` for each aligned target; failures are logged
fn export_aligned(session: &AlignmentSession, dir: &Path) -> Vec<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        log::error!("Cannot create export directory {}: {}", dir.display(), e);
        return Vec::new();
    }

    let mut written = Vec::new();
    for target in session.targets.iter().filter(|t| t.record.status.is_aligned()) {
        let path = dir.join(format!("{}_aligned.pdb", target.name()));
        match write_pdb(&path, &target.molecule) {
            Ok(()) => {
                log::info!("Wrote aligned structure {}", path.display());
                written.push(path);
            }
            Err(e) => log::error!("Failed to write {}: {}", path.display(), e),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name() {
        assert_eq!(object_name(Path::new("pdbs/1abc.pdb")), "1abc");
        assert_eq!(object_name(Path::new("pdbs/1abc.pdb.gz")), "1abc");
        assert_eq!(object_name(Path::new("pdbs/model.v2.pdb")), "model.v2");
    }

    #[test]
    fn test_structure_file_filter() {
        assert!(is_structure_file("a.pdb"));
        assert!(is_structure_file("a.pdb.gz"));
        assert!(!is_structure_file("a.cif"));
        assert!(!is_structure_file("a.PDB"));
    }

    #[test]
    fn test_format_rmsd() {
        assert_eq!(format_rmsd(Some(1.23456)), "1.235");
        assert_eq!(format_rmsd(None), "N/A");
    }
}
