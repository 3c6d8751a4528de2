//! Residue utilities
//!
//! Residue information lives inline on atoms; this module provides the key
//! type, a borrowed per-residue view, and the one-letter code table.

use std::cmp::Ordering;
use std::ops::Range;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::atom::Atom;

/// Marker used for any residue without a one-letter code
pub const UNKNOWN_RESIDUE: char = 'X';

/// Key for uniquely identifying a residue within a molecule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueKey {
    /// Chain identifier
    pub chain: String,
    /// Residue name (e.g., "ALA", "GLY")
    pub resn: String,
    /// Residue sequence number
    pub resv: i32,
    /// Insertion code
    pub inscode: char,
}

impl ResidueKey {
    /// Create a new residue key
    pub fn new(chain: impl Into<String>, resn: impl Into<String>, resv: i32, inscode: char) -> Self {
        ResidueKey {
            chain: chain.into(),
            resn: resn.into(),
            resv,
            inscode,
        }
    }

    /// Order residues by chain, then residue number, then insertion code.
    ///
    /// Blank insertion codes sort before lettered ones, so 52 < 52A < 53.
    pub fn sequence_order(&self, other: &ResidueKey) -> Ordering {
        self.chain
            .cmp(&other.chain)
            .then(self.resv.cmp(&other.resv))
            .then(normalized_inscode(self.inscode).cmp(&normalized_inscode(other.inscode)))
    }

    /// PyMOL-style residue identifier ("52" or "52A")
    pub fn resi(&self) -> String {
        if self.inscode != ' ' && self.inscode != '\0' {
            format!("{}{}", self.resv, self.inscode)
        } else {
            self.resv.to_string()
        }
    }
}

impl std::fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}`{}", self.chain, self.resn, self.resi())
    }
}

fn normalized_inscode(code: char) -> char {
    if code == '\0' {
        ' '
    } else {
        code
    }
}

/// A view into the atoms of a single residue
#[derive(Debug)]
pub struct ResidueView<'a> {
    /// The residue key
    pub key: ResidueKey,
    /// Slice of atoms in this residue
    pub atoms: &'a [Atom],
    /// Range of atom indices in the parent molecule
    pub atom_range: Range<usize>,
}

impl<'a> ResidueView<'a> {
    #[inline]
    pub fn resn(&self) -> &str {
        &self.key.resn
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Iterate over (molecule atom index, atom) pairs
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &'a Atom)> {
        self.atom_range.clone().zip(self.atoms.iter())
    }

    /// Index (into the parent molecule) of the first C-alpha atom
    pub fn ca(&self) -> Option<usize> {
        self.iter_indexed().find(|(_, atom)| atom.is_ca()).map(|(idx, _)| idx)
    }

    /// One-letter code of this residue
    pub fn letter(&self) -> char {
        residue_letter(&self.key.resn)
    }
}

/// Iterator grouping consecutive atoms that share a residue
pub struct ResidueIterator<'a> {
    atoms: &'a [Atom],
    pos: usize,
}

impl<'a> ResidueIterator<'a> {
    pub(crate) fn new(atoms: &'a [Atom]) -> Self {
        ResidueIterator { atoms, pos: 0 }
    }
}

impl<'a> Iterator for ResidueIterator<'a> {
    type Item = ResidueView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.atoms.get(self.pos)?;
        let start = self.pos;
        let mut end = start + 1;
        while end < self.atoms.len() && self.atoms[end].same_residue(first) {
            end += 1;
        }
        self.pos = end;
        Some(ResidueView {
            key: first.residue_key(),
            atoms: &self.atoms[start..end],
            atom_range: start..end,
        })
    }
}

/// The twenty standard amino acids
static THREE_TO_ONE: phf::Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLU" => 'E', "GLN" => 'Q', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
};

/// Convert a 3-letter amino acid code to its 1-letter code.
///
/// Only the twenty standard residues are known; the lookup is exact.
pub fn three_to_one(resn: &str) -> Option<char> {
    THREE_TO_ONE.get(resn).copied()
}

/// One-letter code for a residue name, case-insensitive, [`UNKNOWN_RESIDUE`] otherwise
pub fn residue_letter(resn: &str) -> char {
    three_to_one(&resn.trim().to_ascii_uppercase()).unwrap_or(UNKNOWN_RESIDUE)
}
