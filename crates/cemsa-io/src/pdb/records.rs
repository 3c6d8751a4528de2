//! PDB record types

use cemsa_mol::{Atom, Element};

/// Parsed ATOM or HETATM record
#[derive(Debug, Clone)]
pub struct AtomRecord {
    /// Record type: true for HETATM, false for ATOM
    pub hetatm: bool,
    /// Atom serial number
    pub serial: i32,
    /// Atom name, trimmed
    pub name: String,
    /// Alternate location indicator
    pub alt_loc: char,
    /// Residue name
    pub resn: String,
    /// Chain identifier
    pub chain: String,
    /// Residue sequence number
    pub resv: i32,
    /// Insertion code
    pub icode: char,
    /// X coordinate (Angstroms)
    pub x: f32,
    /// Y coordinate (Angstroms)
    pub y: f32,
    /// Z coordinate (Angstroms)
    pub z: f32,
    /// Occupancy
    pub occupancy: f32,
    /// Temperature factor (B-factor)
    pub b_factor: f32,
    /// Segment identifier
    pub segi: String,
    /// Element symbol column
    pub element: String,
}

impl Default for AtomRecord {
    fn default() -> Self {
        AtomRecord {
            hetatm: false,
            serial: 0,
            name: String::new(),
            alt_loc: ' ',
            resn: String::new(),
            chain: String::new(),
            resv: 0,
            icode: ' ',
            x: 0.0,
            y: 0.0,
            z: 0.0,
            occupancy: 1.0,
            b_factor: 0.0,
            segi: String::new(),
            element: String::new(),
        }
    }
}

impl AtomRecord {
    /// Element from the element column, falling back to the atom name
    pub fn get_element(&self) -> Element {
        if let Some(elem) = Element::from_symbol(&self.element) {
            return elem;
        }

        // Single-atom hetero groups (CA, ZN, MG ...) name the atom after the
        // residue; read those as two-letter elements.
        if self.hetatm && self.name == self.resn {
            if let Some(elem) = Element::from_symbol(&self.name) {
                return elem;
            }
        }

        infer_element_from_name(&self.name)
    }

    /// Convert to a model atom
    pub fn to_atom(&self) -> Atom {
        let mut atom = Atom::new(self.name.clone(), self.get_element());
        atom.resn = self.resn.clone();
        atom.resv = self.resv;
        atom.inscode = self.icode;
        atom.chain = self.chain.clone();
        atom.segi = self.segi.clone();
        atom.alt = self.alt_loc;
        atom.b_factor = self.b_factor;
        atom.occupancy = self.occupancy;
        atom.hetatm = self.hetatm;
        atom.id = self.serial;
        atom
    }
}

/// Infer element from atom name
pub fn infer_element_from_name(name: &str) -> Element {
    let name = name.trim();
    let chars: Vec<char> = name.chars().collect();

    // Hydrogen names such as "1HB" carry a leading digit
    let start_idx = match chars.first() {
        None => return Element::Unknown,
        Some(c) if c.is_ascii_digit() => 1,
        Some(_) => 0,
    };

    if start_idx >= chars.len() {
        return Element::Unknown;
    }

    if chars.len() > start_idx + 1 {
        let two_letter: String = chars[start_idx..=start_idx + 1].iter().collect();
        if let Some(elem) = Element::from_symbol(&two_letter) {
            // CA is C-alpha, CD is C-delta, NE is N-epsilon ... not calcium,
            // cadmium or neon
            let is_common_protein_name = matches!(
                name,
                "CA" | "CB" | "CG" | "CD" | "CE" | "CZ" | "CH" | "NE" | "NH" | "NZ" | "OG" | "OH"
                    | "OE" | "OD" | "SD" | "SG" | "HG" | "HE" | "HD" | "HZ" | "HH"
            );
            if !is_common_protein_name {
                return elem;
            }
        }
    }

    let one_letter = chars[start_idx].to_ascii_uppercase().to_string();
    Element::from_symbol(&one_letter).unwrap_or(Element::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_element_from_name() {
        assert_eq!(infer_element_from_name("CA"), Element::Carbon);
        assert_eq!(infer_element_from_name("N"), Element::Nitrogen);
        assert_eq!(infer_element_from_name("OXT"), Element::Oxygen);
        assert_eq!(infer_element_from_name("1HB"), Element::Hydrogen);
        assert_eq!(infer_element_from_name("FE"), Element::Iron);
        assert_eq!(infer_element_from_name(""), Element::Unknown);
    }

    #[test]
    fn test_element_column_wins() {
        let record = AtomRecord {
            name: "CA".to_string(),
            element: "CA".to_string(),
            ..AtomRecord::default()
        };
        assert_eq!(record.get_element(), Element::Calcium);
    }

    #[test]
    fn test_ion_without_element_column() {
        let record = AtomRecord {
            hetatm: true,
            name: "CA".to_string(),
            resn: "CA".to_string(),
            ..AtomRecord::default()
        };
        assert_eq!(record.get_element(), Element::Calcium);

        let c_alpha = AtomRecord {
            name: "CA".to_string(),
            resn: "ALA".to_string(),
            ..AtomRecord::default()
        };
        assert_eq!(c_alpha.get_element(), Element::Carbon);
    }
}
