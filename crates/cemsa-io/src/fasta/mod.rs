//! FASTA sequence files
//!
//! A record is a `>` header line followed by any number of sequence lines.

mod parser;
mod writer;

pub use parser::parse_fasta_str;
pub use writer::FastaWriter;

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use crate::error::IoResult;

/// One FASTA entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header text without the leading `>`, whitespace-trimmed
    pub header: String,
    /// Concatenated sequence lines
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(header: impl Into<String>, sequence: impl Into<String>) -> Self {
        FastaRecord {
            header: header.into(),
            sequence: sequence.into(),
        }
    }
}

/// Read all records of a FASTA file, in file order
pub fn read_fasta(path: &Path) -> IoResult<Vec<FastaRecord>> {
    let mut text = String::new();
    crate::compress::open_file(path)?.read_to_string(&mut text)?;
    Ok(parse_fasta_str(&text))
}

/// Write records to a FASTA file.
///
/// `line_width` of 0 keeps each sequence on a single line.
pub fn write_fasta(path: &Path, records: &[FastaRecord], line_width: usize) -> IoResult<()> {
    let mut writer = FastaWriter::new(BufWriter::new(File::create(path)?)).with_line_width(line_width);
    for record in records {
        writer.write_record(&record.header, &record.sequence)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.fasta");
        let records = vec![
            FastaRecord::new("ref_aligned", "ACDEFGHIK"),
            FastaRecord::new("t1_aligned", "ACDXFGHIK"),
        ];

        write_fasta(&path, &records, 0).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            ">ref_aligned\nACDEFGHIK\n>t1_aligned\nACDXFGHIK\n"
        );
        assert_eq!(read_fasta(&path).unwrap(), records);
    }

    #[test]
    fn test_wrapped_file_reads_back_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapped.fasta");
        let records = vec![FastaRecord::new("ref", "ACDEFGHIKLMNPQRSTVWY")];

        write_fasta(&path, &records, 8).unwrap();
        assert_eq!(read_fasta(&path).unwrap(), records);
    }
}
