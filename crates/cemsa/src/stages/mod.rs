//! The three pipeline stages
//!
//! 1. [`ce_align`] - superpose every target onto the reference, save a session
//! 2. [`correspond`] - pair proximal C-alpha atoms, write pairwise FASTA files
//! 3. [`merge`] - assemble the pairwise files into one MSA

pub mod ce_align;
pub mod correspond;
pub mod merge;

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

/// Regular files in `dir` whose name satisfies `keep`, sorted by file name
pub(crate) fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> PipelineResult<Vec<PathBuf>> {
    let read_dir_error = |source| PipelineError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if keep(name) {
                files.push(path);
            }
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdb", "a.pdb", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("c.pdb")).unwrap();

        let files = list_files(dir.path(), |n| n.ends_with(".pdb")).unwrap();
        let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["a.pdb", "b.pdb"]);
    }

    #[test]
    fn test_list_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = list_files(&dir.path().join("nope"), |_| true);
        assert!(matches!(result, Err(PipelineError::ReadDir { .. })));
    }
}
