//! Reader and writer traits for structure files

use cemsa_mol::Molecule;

use crate::error::IoResult;

/// Trait for reading a molecule from a source
pub trait MoleculeReader {
    /// Read the next (and for PDB, only) molecule
    fn read(&mut self) -> IoResult<Molecule>;
}

/// Trait for writing molecules to a sink
pub trait MoleculeWriter {
    /// Write a single molecule
    fn write(&mut self, mol: &Molecule) -> IoResult<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> IoResult<()>;
}
