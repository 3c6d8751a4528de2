//! Structure and sequence file I/O
//!
//! - [`pdb`] - PDB reader (first model, gzip-transparent) and writer
//! - [`fasta`] - FASTA reader and writer
//!
//! ```no_run
//! use std::path::Path;
//!
//! let mol = cemsa_io::pdb::read_pdb(Path::new("pdbs/ref.pdb")).unwrap();
//! let records = cemsa_io::fasta::read_fasta(Path::new("t1_seq_align.fasta")).unwrap();
//! println!("{} atoms, {} sequences", mol.atom_count(), records.len());
//! ```

pub mod compress;
pub mod error;
pub mod fasta;
pub mod pdb;
pub mod traits;

pub use error::{IoError, IoResult};
pub use fasta::{read_fasta, write_fasta, FastaRecord, FastaWriter};
pub use pdb::{read_pdb, read_pdb_str, write_pdb, PdbReader, PdbWriter};
pub use traits::{MoleculeReader, MoleculeWriter};
