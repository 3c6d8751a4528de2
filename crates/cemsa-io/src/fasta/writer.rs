//! FASTA writer

use std::io::Write;

use crate::error::IoResult;

/// Writes `>header` / sequence pairs
pub struct FastaWriter<W> {
    writer: W,
    line_width: usize,
}

impl<W: Write> FastaWriter<W> {
    /// Create a writer that keeps every sequence on one line
    pub fn new(writer: W) -> Self {
        FastaWriter {
            writer,
            line_width: 0,
        }
    }

    /// Wrap sequences at `width` characters (0 disables wrapping)
    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    pub fn write_record(&mut self, header: &str, sequence: &str) -> IoResult<()> {
        writeln!(self.writer, ">{}", header)?;
        if self.line_width == 0 || sequence.is_empty() {
            writeln!(self.writer, "{}", sequence)?;
        } else {
            let residues: Vec<char> = sequence.chars().collect();
            for line in residues.chunks(self.line_width) {
                writeln!(self.writer, "{}", line.iter().collect::<String>())?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> IoResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(line_width: usize, records: &[(&str, &str)]) -> String {
        let mut out = Vec::new();
        let mut writer = FastaWriter::new(&mut out).with_line_width(line_width);
        for (header, sequence) in records {
            writer.write_record(header, sequence).unwrap();
        }
        writer.flush().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_line_output() {
        assert_eq!(
            written(0, &[("ref", "ACDE"), ("empty", "")]),
            ">ref\nACDE\n>empty\n\n"
        );
    }

    #[test]
    fn test_wrapped_output() {
        assert_eq!(written(3, &[("ref", "ACDEFGH")]), ">ref\nACD\nEFG\nH\n");
    }

    #[test]
    fn test_wraps_on_characters() {
        assert_eq!(written(2, &[("odd", "ÅÅÅB")]), ">odd\nÅÅ\nÅB\n");
    }
}
