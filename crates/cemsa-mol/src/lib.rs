//! Molecular data model for the cemsa pipeline
//!
//! - [`Atom`] - atom record with residue and chain information inline
//! - [`Molecule`] - named container of atoms with one coordinate per atom
//! - [`ResidueKey`] / [`ResidueView`] - residue identity and per-residue views
//! - [`ca_within`] - proximity selection of C-alpha atoms between two molecules
//!
//! # Example
//!
//! ```rust
//! use cemsa_mol::{Atom, Element, Molecule};
//! use lin_alg::f32::Vec3;
//!
//! let mut mol = Molecule::new("ref");
//! mol.add_atom(Atom::new("N", Element::Nitrogen).with_residue("ALA", 1, "A"), Vec3::new(0.0, 0.0, 0.0));
//! mol.add_atom(Atom::new("CA", Element::Carbon).with_residue("ALA", 1, "A"), Vec3::new(1.46, 0.0, 0.0));
//!
//! assert_eq!(mol.atom_count(), 2);
//! assert_eq!(mol.ca_indices(), vec![1]);
//! assert_eq!(mol.residues().count(), 1);
//! ```

mod atom;
mod element;
mod error;
mod molecule;
mod residue;
pub mod serde_helpers;
mod spatial;

pub use atom::Atom;
pub use element::Element;
pub use error::{MolError, MolResult};
pub use molecule::Molecule;
pub use residue::{
    residue_letter, three_to_one, ResidueIterator, ResidueKey, ResidueView, UNKNOWN_RESIDUE,
};
pub use spatial::ca_within;
