//! Native session file format: MessagePack + gzip (`.prs`).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::model::AlignmentSession;

/// Errors for session save/load operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),
}

/// Save a session to a `.prs` file.
pub fn save_session(session: &AlignmentSession, path: &Path) -> Result<(), SessionError> {
    let data = rmp_serde::to_vec_named(session)?;
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&data)?;
    encoder.finish()?.flush()?;
    Ok(())
}

/// Load a session from a `.prs` file.
pub fn load_session(path: &Path) -> Result<AlignmentSession, SessionError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    let session: AlignmentSession = rmp_serde::from_slice(&bytes)?;
    Ok(session)
}
