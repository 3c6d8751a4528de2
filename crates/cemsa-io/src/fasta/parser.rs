//! FASTA parser

use nom::character::complete::char;
use nom::combinator::rest;
use nom::sequence::preceded;
use nom::IResult;

use super::FastaRecord;

enum Line<'a> {
    Header(&'a str),
    Sequence(&'a str),
}

fn header_line(input: &str) -> IResult<&str, &str> {
    preceded(char('>'), rest)(input)
}

fn classify(line: &str) -> Line<'_> {
    match header_line(line) {
        Ok((_, header)) => Line::Header(header.trim()),
        Err(_) => Line::Sequence(line.trim()),
    }
}

/// Parse FASTA text into records in file order.
///
/// A line is a header only when its first character is `>`. Sequence lines
/// are trimmed and concatenated; anything before the first header is
/// ignored. Duplicate headers are kept as separate records.
pub fn parse_fasta_str(text: &str) -> Vec<FastaRecord> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in text.lines() {
        match classify(line) {
            Line::Header(header) => {
                if let Some(done) = current.take() {
                    records.push(done);
                }
                current = Some(FastaRecord::new(header, String::new()));
            }
            Line::Sequence(seq) => {
                if let Some(record) = current.as_mut() {
                    record.sequence.push_str(seq);
                }
            }
        }
    }

    records.extend(current);
    records
}
