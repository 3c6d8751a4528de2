//! PDB file writer

use std::io::Write;

use cemsa_mol::{Atom, Molecule};

use crate::error::{IoError, IoResult};
use crate::traits::MoleculeWriter;

/// Residue numbers that fit the four resSeq columns
const RESV_RANGE: std::ops::RangeInclusive<i32> = -999..=9999;

/// PDB file writer.
///
/// Atoms are renumbered from 1; a TER record closes each chain. Residue
/// numbers outside -999..=9999 are rejected rather than spilling into the
/// neighbouring columns.
pub struct PdbWriter<W> {
    writer: W,
}

impl<W: Write> PdbWriter<W> {
    /// Create a new PDB writer
    pub fn new(writer: W) -> Self {
        PdbWriter { writer }
    }

    /// Write title record
    fn write_title(&mut self, title: &str) -> IoResult<()> {
        for (i, chunk) in title.as_bytes().chunks(70).enumerate() {
            let cont = if i > 0 {
                format!("{:>2} ", i + 1)
            } else {
                "   ".to_string()
            };
            writeln!(self.writer, "TITLE  {}{}", cont, String::from_utf8_lossy(chunk))?;
        }
        Ok(())
    }

    /// Write ATOM/HETATM record
    fn write_atom(&mut self, serial: i32, atom: &Atom, x: f32, y: f32, z: f32) -> IoResult<()> {
        let record_type = if atom.hetatm { "HETATM" } else { "ATOM  " };
        let name = format_atom_name(&atom.name, atom.element.symbol());
        let element = if atom.element.is_unknown() {
            "  ".to_string()
        } else {
            format!("{:>2}", atom.element.symbol().to_ascii_uppercase())
        };

        writeln!(
            self.writer,
            "{}{:5} {:4}{}{:>3} {}{:4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}      {:<4}{}",
            record_type,
            serial % 100000,
            name,
            atom.alt,
            truncate(&atom.resn, 3),
            chain_char(&atom.chain),
            atom.resv,
            atom.inscode,
            x,
            y,
            z,
            atom.occupancy,
            atom.b_factor,
            truncate(&atom.segi, 4),
            element,
        )?;

        Ok(())
    }

    /// Write TER record
    fn write_ter(&mut self, serial: i32, atom: &Atom) -> IoResult<()> {
        writeln!(
            self.writer,
            "TER   {:5}      {:>3} {}{:4}{}",
            serial % 100000,
            truncate(&atom.resn, 3),
            chain_char(&atom.chain),
            atom.resv,
            atom.inscode
        )?;
        Ok(())
    }

    /// Write a molecule
    fn write_molecule(&mut self, mol: &Molecule) -> IoResult<()> {
        if mol.is_empty() {
            return Err(IoError::EmptyFile);
        }
        if let Some(atom) = mol.atoms().iter().find(|a| !RESV_RANGE.contains(&a.resv)) {
            return Err(IoError::invalid_record(format!(
                "residue number {} of {} {} does not fit the PDB resSeq field",
                atom.resv, atom.chain, atom.resn
            )));
        }

        self.write_title(&mol.title)?;

        let mut serial = 1;
        let mut previous: Option<&Atom> = None;

        for (_, atom, coord) in mol.iter() {
            if let Some(prev) = previous {
                if prev.chain != atom.chain {
                    self.write_ter(serial, prev)?;
                    serial += 1;
                }
            }
            self.write_atom(serial, atom, coord.x, coord.y, coord.z)?;
            serial += 1;
            previous = Some(atom);
        }

        if let Some(last) = previous {
            self.write_ter(serial, last)?;
        }

        writeln!(self.writer, "END")?;
        Ok(())
    }
}

impl<W: Write> MoleculeWriter for PdbWriter<W> {
    fn write(&mut self, mol: &Molecule) -> IoResult<()> {
        self.write_molecule(mol)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn chain_char(chain: &str) -> char {
    chain.chars().next().unwrap_or(' ')
}

/// Format atom name according to PDB conventions.
///
/// Names of one-letter elements start in column 14, two-letter elements in
/// column 13.
fn format_atom_name(name: &str, element: &str) -> String {
    let name = name.trim();
    if name.len() >= 4 {
        truncate(name, 4).to_string()
    } else if element.len() == 1 && !name.starts_with(char::is_numeric) {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdb::read_pdb_str;
    use cemsa_mol::Element;
    use lin_alg::f32::Vec3;

    fn create_test_molecule() -> Molecule {
        let mut mol = Molecule::new("test");
        mol.add_atom(
            Atom::new("N", Element::Nitrogen).with_residue("ALA", 1, "A"),
            Vec3::new(0.0, 0.0, 0.0),
        );
        mol.add_atom(
            Atom::new("CA", Element::Carbon).with_residue("ALA", 1, "A"),
            Vec3::new(1.5, 0.0, 0.0),
        );
        mol.add_atom(
            Atom::new("CA", Element::Carbon).with_residue("GLY", 7, "B"),
            Vec3::new(-3.25, 4.125, 10.0),
        );
        mol
    }

    #[test]
    fn test_format_atom_name() {
        assert_eq!(format_atom_name("N", "N"), " N  ");
        assert_eq!(format_atom_name("CA", "C"), " CA ");
        assert_eq!(format_atom_name("FE", "Fe"), "FE  ");
        assert_eq!(format_atom_name("HD21", "H"), "HD21");
    }

    #[test]
    fn test_write_columns() {
        let mut output = Vec::new();
        PdbWriter::new(&mut output).write(&create_test_molecule()).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[1],
            "ATOM      2  CA  ALA A   1       1.500   0.000   0.000  1.00  0.00           C"
        );
        assert!(lines[2].starts_with("TER       3      ALA A   1"));
        assert!(lines[3].starts_with("ATOM      4  CA  GLY B   7"));
        assert!(lines[4].starts_with("TER"));
        assert_eq!(lines.last(), Some(&"END"));
    }

    #[test]
    fn test_write_then_read_preserves_structure() {
        let mol = create_test_molecule();
        let mut output = Vec::new();
        PdbWriter::new(&mut output).write(&mol).unwrap();

        let reread = read_pdb_str(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(reread.atom_count(), 3);
        assert_eq!(reread.atoms()[2].chain, "B");
        assert_eq!(reread.atoms()[2].resv, 7);
        assert_eq!(reread.ca_indices(), vec![1, 2]);
        let moved = reread.coord(2).unwrap();
        assert!((moved.y - 4.125).abs() < 1e-3);
    }

    #[test]
    fn test_empty_molecule_is_rejected() {
        let mut output = Vec::new();
        let result = PdbWriter::new(&mut output).write(&Molecule::new("empty"));
        assert!(matches!(result, Err(IoError::EmptyFile)));
    }

    #[test]
    fn test_residue_numbers_must_fit_columns() {
        for resv in [9999, -999] {
            let mut mol = create_test_molecule();
            mol.add_atom(
                Atom::new("CA", Element::Carbon).with_residue("SER", resv, "B"),
                Vec3::new(0.0, 0.0, 0.0),
            );
            let mut output = Vec::new();
            PdbWriter::new(&mut output).write(&mol).unwrap();
            let text = String::from_utf8(output).unwrap();
            assert_eq!(read_pdb_str(&text).unwrap().atoms()[3].resv, resv);
        }

        for resv in [10000, -1000] {
            let mut mol = create_test_molecule();
            mol.add_atom(
                Atom::new("CA", Element::Carbon).with_residue("SER", resv, "B"),
                Vec3::new(0.0, 0.0, 0.0),
            );
            let mut output = Vec::new();
            let result = PdbWriter::new(&mut output).write(&mol);
            assert!(matches!(result, Err(IoError::InvalidRecord(_))), "resv {}", resv);
            assert!(output.is_empty());
        }
    }
}
