//! PDB file format parser and writer

mod parser;
mod records;
mod writer;

pub use parser::PdbReader;
pub use records::{infer_element_from_name, AtomRecord};
pub use writer::PdbWriter;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use cemsa_mol::Molecule;

use crate::error::{IoError, IoResult};
use crate::traits::{MoleculeReader, MoleculeWriter};

/// Read a PDB file (plain or gzip-compressed) from a path.
///
/// The molecule name is left empty; `source` records the path.
pub fn read_pdb(path: &Path) -> IoResult<Molecule> {
    let file = crate::compress::open_file(path)?;
    let gzipped = file.is_gzip();
    let mut mol = PdbReader::new(file).read().map_err(|e| match e {
        IoError::Io(err) if gzipped => IoError::Decompression(err.to_string()),
        other => other,
    })?;
    mol.source = Some(path.to_path_buf());
    Ok(mol)
}

/// Read a PDB file from a string
pub fn read_pdb_str(content: &str) -> IoResult<Molecule> {
    PdbReader::new(content.as_bytes()).read()
}

/// Write a molecule to a PDB file
pub fn write_pdb(path: &Path, mol: &Molecule) -> IoResult<()> {
    let mut writer = PdbWriter::new(BufWriter::new(File::create(path)?));
    writer.write(mol)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const TWO_ATOMS: &str = "\
ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  CA  GLY A   1       1.458   0.000   0.000  1.00  0.00           C
END
";

    #[test]
    fn test_read_pdb_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gly.pdb");
        std::fs::write(&path, TWO_ATOMS).unwrap();

        let mol = read_pdb(&path).unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_read_gzipped_pdb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gly.pdb.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(TWO_ATOMS.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let mol = read_pdb(&path).unwrap();
        assert_eq!(mol.ca_indices(), vec![1]);
    }

    #[test]
    fn test_broken_gzip_header_is_decompression_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdb.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x08]).unwrap();

        assert!(matches!(read_pdb(&path), Err(IoError::Decompression(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_pdb(Path::new("/nonexistent/dir/none.pdb"));
        assert!(matches!(result, Err(IoError::Io(_))));
    }

    #[test]
    fn test_write_pdb_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdb");
        let mol = read_pdb_str(TWO_ATOMS).unwrap();

        write_pdb(&path, &mol).unwrap();
        let back = read_pdb(&path).unwrap();
        assert_eq!(back.atom_count(), 2);
    }
}
