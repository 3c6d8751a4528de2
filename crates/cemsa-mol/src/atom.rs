//! Atom data structure
//!
//! Residue and chain information is stored inline on every atom, the way a
//! PDB file lays it out. Residue-level views are derived on demand.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::residue::ResidueKey;

/// A single atom record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Atom name (e.g., "CA", "N", "O")
    pub name: String,

    /// Chemical element
    pub element: Element,

    /// Residue name (e.g., "ALA", "GLY")
    pub resn: String,

    /// Residue sequence number
    pub resv: i32,

    /// Insertion code (for residues sharing a sequence number)
    pub inscode: char,

    /// Chain identifier
    pub chain: String,

    /// Segment identifier
    pub segi: String,

    /// Alternate location indicator
    pub alt: char,

    /// B-factor
    pub b_factor: f32,

    /// Occupancy (0.0 to 1.0)
    pub occupancy: f32,

    /// Whether the atom came from a HETATM record
    pub hetatm: bool,

    /// PDB atom serial number
    pub id: i32,
}

impl Default for Atom {
    fn default() -> Self {
        Atom {
            name: String::new(),
            element: Element::Unknown,
            resn: String::new(),
            resv: 0,
            inscode: ' ',
            chain: String::new(),
            segi: String::new(),
            alt: ' ',
            b_factor: 0.0,
            occupancy: 1.0,
            hetatm: false,
            id: 0,
        }
    }
}

impl Atom {
    /// Create a new atom with the given name and element
    pub fn new(name: impl Into<String>, element: Element) -> Self {
        Atom {
            name: name.into(),
            element,
            ..Atom::default()
        }
    }

    /// Set the residue information
    pub fn set_residue(&mut self, resn: impl Into<String>, resv: i32, chain: impl Into<String>) {
        self.resn = resn.into();
        self.resv = resv;
        self.chain = chain.into();
    }

    /// Builder-style variant of [`Atom::set_residue`]
    pub fn with_residue(mut self, resn: impl Into<String>, resv: i32, chain: impl Into<String>) -> Self {
        self.set_residue(resn, resv, chain);
        self
    }

    /// Check if this is a C-alpha atom.
    ///
    /// The element test keeps calcium ions (also named "CA") out.
    #[inline]
    pub fn is_ca(&self) -> bool {
        self.name == "CA" && self.element.is_carbon()
    }

    /// Key of the residue this atom belongs to
    pub fn residue_key(&self) -> ResidueKey {
        ResidueKey::new(self.chain.clone(), self.resn.clone(), self.resv, self.inscode)
    }

    /// Check whether two atoms belong to the same residue
    #[inline]
    pub fn same_residue(&self, other: &Atom) -> bool {
        self.chain == other.chain
            && self.resv == other.resv
            && self.inscode == other.inscode
            && self.resn == other.resn
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Atom({} {} {} {}{})",
            self.name,
            self.element.symbol(),
            self.chain,
            self.resn,
            self.resv
        )
    }
}
