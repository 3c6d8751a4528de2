//! Chemical elements
//!
//! Only the elements that routinely appear in deposited protein structures
//! get their own variant; everything else is carried as [`Element::Unknown`].

use serde::{Deserialize, Serialize};

/// Chemical element of an atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    Hydrogen,
    Deuterium,
    Carbon,
    Nitrogen,
    Oxygen,
    Fluorine,
    Sodium,
    Magnesium,
    Phosphorus,
    Sulfur,
    Chlorine,
    Potassium,
    Calcium,
    Manganese,
    Iron,
    Cobalt,
    Nickel,
    Copper,
    Zinc,
    Selenium,
    Bromine,
    Iodine,
    #[default]
    Unknown,
}

impl Element {
    /// Look up an element by its symbol (case-insensitive)
    pub fn from_symbol(symbol: &str) -> Option<Element> {
        let element = match symbol.trim().to_ascii_uppercase().as_str() {
            "H" => Element::Hydrogen,
            "D" => Element::Deuterium,
            "C" => Element::Carbon,
            "N" => Element::Nitrogen,
            "O" => Element::Oxygen,
            "F" => Element::Fluorine,
            "NA" => Element::Sodium,
            "MG" => Element::Magnesium,
            "P" => Element::Phosphorus,
            "S" => Element::Sulfur,
            "CL" => Element::Chlorine,
            "K" => Element::Potassium,
            "CA" => Element::Calcium,
            "MN" => Element::Manganese,
            "FE" => Element::Iron,
            "CO" => Element::Cobalt,
            "NI" => Element::Nickel,
            "CU" => Element::Copper,
            "ZN" => Element::Zinc,
            "SE" => Element::Selenium,
            "BR" => Element::Bromine,
            "I" => Element::Iodine,
            _ => return None,
        };
        Some(element)
    }

    /// Element symbol in PDB capitalisation ("C", "Fe", ...)
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Hydrogen => "H",
            Element::Deuterium => "D",
            Element::Carbon => "C",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Fluorine => "F",
            Element::Sodium => "Na",
            Element::Magnesium => "Mg",
            Element::Phosphorus => "P",
            Element::Sulfur => "S",
            Element::Chlorine => "Cl",
            Element::Potassium => "K",
            Element::Calcium => "Ca",
            Element::Manganese => "Mn",
            Element::Iron => "Fe",
            Element::Cobalt => "Co",
            Element::Nickel => "Ni",
            Element::Copper => "Cu",
            Element::Zinc => "Zn",
            Element::Selenium => "Se",
            Element::Bromine => "Br",
            Element::Iodine => "I",
            Element::Unknown => "X",
        }
    }

    #[inline]
    pub fn is_carbon(&self) -> bool {
        matches!(self, Element::Carbon)
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Element::Unknown)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
