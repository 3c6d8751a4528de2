//! PDB file parser
//!
//! Reads ATOM/HETATM records of the first model into a [`Molecule`].

use std::io::{BufRead, BufReader, Read};
use std::ops::Range;

use cemsa_mol::Molecule;
use lin_alg::f32::Vec3;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::error::{Error, ErrorKind};
use nom::IResult;

use crate::error::{IoError, IoResult};
use crate::traits::MoleculeReader;

use super::records::AtomRecord;

/// PDB file reader
pub struct PdbReader<R> {
    reader: BufReader<R>,
    line_number: usize,
}

impl<R: Read> PdbReader<R> {
    /// Create a new PDB reader
    pub fn new(reader: R) -> Self {
        PdbReader {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Read a single line from the file
    fn read_line(&mut self) -> IoResult<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_number += 1;
                Ok(Some(line))
            }
            Err(e) => Err(IoError::Io(e)),
        }
    }

    /// Parse the PDB file
    fn parse(&mut self) -> IoResult<Molecule> {
        let mut mol = Molecule::new("");
        let mut title = String::new();
        let mut first_model_done = false;
        let mut extra_models = 0usize;

        while let Some(line) = self.read_line()? {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let record_type = line.get(0..6).unwrap_or(line);

            match record_type {
                "ATOM  " | "HETATM" => {
                    if first_model_done {
                        continue;
                    }
                    match parse_atom_record(line) {
                        Ok((_, record)) => {
                            let coord = Vec3::new(record.x, record.y, record.z);
                            mol.add_atom(record.to_atom(), coord);
                        }
                        Err(_) => {
                            log::warn!("Skipping malformed atom record at line {}", self.line_number);
                        }
                    }
                }
                "TITLE " => {
                    if let Some(text) = line.get(10..) {
                        if !title.is_empty() {
                            title.push(' ');
                        }
                        title.push_str(text.trim());
                    }
                }
                "MODEL " => {
                    if first_model_done {
                        extra_models += 1;
                    }
                }
                "ENDMDL" => {
                    first_model_done = true;
                }
                "END" => break,
                _ => {}
            }
        }

        if extra_models > 0 {
            log::debug!("Ignored {} additional model(s); only the first is kept", extra_models);
        }

        if mol.is_empty() {
            return Err(IoError::EmptyFile);
        }

        mol.title = title;
        Ok(mol)
    }
}

impl<R: Read> MoleculeReader for PdbReader<R> {
    fn read(&mut self) -> IoResult<Molecule> {
        self.parse()
    }
}

// ============================================================================
// Record parsers
// ============================================================================

fn record_kind(input: &str) -> IResult<&str, bool> {
    let (rest, kind) = alt((tag("ATOM  "), tag("HETATM")))(input)?;
    Ok((rest, kind == "HETATM"))
}

fn column(line: &str, range: Range<usize>) -> &str {
    line.get(range).unwrap_or("").trim()
}

fn column_char(line: &str, idx: usize) -> char {
    line.as_bytes().get(idx).map(|&b| b as char).unwrap_or(' ')
}

fn coordinate(line: &str, range: Range<usize>) -> Result<f32, nom::Err<Error<&str>>> {
    column(line, range)
        .parse()
        .map_err(|_| nom::Err::Error(Error::new(line, ErrorKind::Float)))
}

/// Parse an ATOM or HETATM record.
///
/// Fixed columns (0-indexed): serial 6-10, name 12-15, altLoc 16, resName
/// 17-19, chainID 21, resSeq 22-25, iCode 26, x/y/z 30-53, occupancy 54-59,
/// tempFactor 60-65, segment 72-75, element 76-77. Coordinates are
/// mandatory; every other field falls back to a default.
fn parse_atom_record(input: &str) -> IResult<&str, AtomRecord> {
    let (_, hetatm) = record_kind(input)?;

    let x = coordinate(input, 30..38)?;
    let y = coordinate(input, 38..46)?;
    let z = coordinate(input, 46..54)?;

    let record = AtomRecord {
        hetatm,
        serial: column(input, 6..11).parse().unwrap_or(0),
        name: column(input, 12..16).to_string(),
        alt_loc: column_char(input, 16),
        resn: column(input, 17..20).to_string(),
        chain: column(input, 21..22).to_string(),
        resv: column(input, 22..26).parse().unwrap_or(0),
        icode: column_char(input, 26),
        x,
        y,
        z,
        occupancy: column(input, 54..60).parse().unwrap_or(1.0),
        b_factor: column(input, 60..66).parse().unwrap_or(0.0),
        segi: column(input, 72..76).to_string(),
        element: column(input, 76..78).to_string(),
    };

    Ok(("", record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cemsa_mol::Element;

    #[test]
    fn test_parse_atom_record() {
        let line =
            "ATOM      1  N   ALA A   1       1.000   2.000   3.000  1.00 20.00           N  ";
        let (_, record) = parse_atom_record(line).unwrap();

        assert_eq!(record.serial, 1);
        assert_eq!(record.name, "N");
        assert_eq!(record.resn, "ALA");
        assert_eq!(record.chain, "A");
        assert_eq!(record.resv, 1);
        assert!((record.x - 1.0).abs() < 0.001);
        assert!((record.y - 2.0).abs() < 0.001);
        assert!((record.z - 3.0).abs() < 0.001);
        assert!((record.b_factor - 20.0).abs() < 0.001);
        assert_eq!(record.element, "N");
    }

    #[test]
    fn test_parse_hetatm_with_insertion_and_altloc() {
        let line =
            "HETATM   12  CA BSER B  52A     -1.500  12.250   0.125  0.50 30.00           C  ";
        let (_, record) = parse_atom_record(line).unwrap();

        assert!(record.hetatm);
        assert_eq!(record.alt_loc, 'B');
        assert_eq!(record.icode, 'A');
        assert_eq!(record.resv, 52);
        assert!((record.occupancy - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_reject_bad_coordinates() {
        let line = "ATOM      1  N   ALA A   1       x.xxx   2.000   3.000";
        assert!(parse_atom_record(line).is_err());
        assert!(parse_atom_record("REMARK   1").is_err());
        assert!(parse_atom_record("ATOM      1  N").is_err());
    }

    #[test]
    fn test_read_simple_pdb() {
        let pdb = r#"TITLE     TEST PEPTIDE
ATOM      1  N   ALA A   1       0.000   0.000   0.000  1.00 20.00           N
ATOM      2  CA  ALA A   1       1.458   0.000   0.000  1.00 20.00           C
ATOM      3  C   ALA A   1       2.009   1.420   0.000  1.00 20.00           C
ATOM      4  O   ALA A   1       1.251   2.390   0.000  1.00 20.00           O
END
ATOM      5  O   HOH A   2       9.000   9.000   9.000  1.00 20.00           O
"#;

        let mut reader = PdbReader::new(pdb.as_bytes());
        let mol = reader.read().unwrap();

        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.title, "TEST PEPTIDE");
        assert_eq!(mol.name, "");
        assert_eq!(mol.atoms()[1].element, Element::Carbon);
        assert_eq!(mol.ca_indices(), vec![1]);
    }

    #[test]
    fn test_only_first_model_is_kept() {
        let pdb = r#"MODEL        1
ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  CA  GLY A   1       5.000   5.000   5.000  1.00  0.00           C
ENDMDL
END
"#;
        let mol = PdbReader::new(pdb.as_bytes()).read().unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.coord(0).map(|c| c.x), Some(0.0));
    }

    #[test]
    fn test_empty_file() {
        let result = PdbReader::new("REMARK nothing here\nEND\n".as_bytes()).read();
        assert!(matches!(result, Err(IoError::EmptyFile)));
    }
}
