//! Transparent gzip handling for input files
//!
//! Compression is detected from the magic bytes rather than the file name, so
//! a gzipped file without a `.gz` suffix still loads.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::IoResult;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check whether the buffered stream starts with the gzip magic bytes.
///
/// Nothing is consumed from the reader.
pub fn is_gzip<R: BufRead>(reader: &mut R) -> std::io::Result<bool> {
    let buf = reader.fill_buf()?;
    Ok(buf.len() >= 2 && buf[..2] == GZIP_MAGIC)
}

/// Reader that transparently handles gzip compression
pub enum MaybeGzReader<R: Read> {
    /// Plain uncompressed reader
    Plain(R),
    /// Gzip-compressed reader
    Gzip(GzDecoder<R>),
}

impl<R: Read> MaybeGzReader<R> {
    pub fn is_gzip(&self) -> bool {
        matches!(self, MaybeGzReader::Gzip(_))
    }
}

impl<R: Read> Read for MaybeGzReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            MaybeGzReader::Plain(r) => r.read(buf),
            MaybeGzReader::Gzip(r) => r.read(buf),
        }
    }
}

/// Open a file for reading, decompressing on the fly when it is gzipped
pub fn open_file(path: &Path) -> IoResult<MaybeGzReader<BufReader<File>>> {
    let mut reader = BufReader::new(File::open(path)?);
    if is_gzip(&mut reader)? {
        Ok(MaybeGzReader::Gzip(GzDecoder::new(reader)))
    } else {
        Ok(MaybeGzReader::Plain(reader))
    }
}
