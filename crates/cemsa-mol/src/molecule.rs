//! Molecular object container
//!
//! [`Molecule`] holds one structure: a flat atom array plus one coordinate per
//! atom. Only a single state is kept; multi-model inputs are reduced to their
//! first model at load time.

use std::path::PathBuf;

use ahash::AHashSet;
use lin_alg::f32::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::error::{MolError, MolResult};
use crate::residue::{ResidueIterator, ResidueKey};

/// A named molecular object with coordinates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Molecule {
    /// Object name (e.g. "ref" or the file stem of a target)
    pub name: String,

    /// Title from the source file, if any
    pub title: String,

    /// File the molecule was loaded from
    pub source: Option<PathBuf>,

    atoms: Vec<Atom>,

    #[serde(with = "crate::serde_helpers::vec3_vec_serde")]
    coords: Vec<Vec3>,
}

impl Molecule {
    /// Create an empty molecule
    pub fn new(name: impl Into<String>) -> Self {
        Molecule {
            name: name.into(),
            ..Molecule::default()
        }
    }

    /// Append an atom with its coordinate, returning the new atom index
    pub fn add_atom(&mut self, atom: Atom, coord: Vec3) -> usize {
        self.atoms.push(atom);
        self.coords.push(coord);
        self.atoms.len() - 1
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    pub fn get_atom(&self, idx: usize) -> Option<&Atom> {
        self.atoms.get(idx)
    }

    pub fn coord(&self, idx: usize) -> Option<Vec3> {
        self.coords.get(idx).copied()
    }

    /// Iterate over (index, atom, coordinate) triples
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Atom, Vec3)> {
        self.atoms
            .iter()
            .zip(self.coords.iter())
            .enumerate()
            .map(|(idx, (atom, coord))| (idx, atom, *coord))
    }

    /// Coordinates of the given atoms as plain arrays
    pub fn extract_coords(&self, indices: &[usize]) -> MolResult<Vec<[f32; 3]>> {
        indices
            .iter()
            .map(|&idx| {
                self.coord(idx)
                    .map(|v| [v.x, v.y, v.z])
                    .ok_or(MolError::AtomIndexOutOfBounds(idx, self.atoms.len()))
            })
            .collect()
    }

    /// Iterate over residues (runs of consecutive atoms sharing a residue key)
    pub fn residues(&self) -> ResidueIterator<'_> {
        ResidueIterator::new(&self.atoms)
    }

    /// Indices of C-alpha atoms, one per residue, in file order.
    ///
    /// When a residue carries several CA atoms (alternate locations, or a
    /// residue split across the file) only the first one is kept.
    pub fn ca_indices(&self) -> Vec<usize> {
        let mut seen: AHashSet<ResidueKey> = AHashSet::new();
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.is_ca())
            .filter(|(_, atom)| seen.insert(atom.residue_key()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Apply a rigid-body transform to every coordinate.
    ///
    /// `transform.data` is row-major (`data[row * 4 + col]`) with the
    /// translation in the last column.
    pub fn transform(&mut self, transform: &Mat4) {
        let m = &transform.data;
        for coord in &mut self.coords {
            let (x, y, z) = (coord.x, coord.y, coord.z);
            *coord = Vec3::new(
                m[0] * x + m[1] * y + m[2] * z + m[3],
                m[4] * x + m[5] * y + m[6] * z + m[7],
                m[8] * x + m[9] * y + m[10] * z + m[11],
            );
        }
    }

}
