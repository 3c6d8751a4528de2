//! Logger setup
//!
//! `env_logger` writes every record to stderr and, when a log file is
//! configured, to that file as well. Lines read
//! `<timestamp> - <LEVEL> - <message>`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Env, Target};

use crate::error::{PipelineError, PipelineResult};

/// Writer duplicating everything into two sinks
pub struct TeeWriter<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

fn open_log_file(path: &Path) -> PipelineResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PipelineError::Logging(format!("cannot open {}: {}", path.display(), e)))
}

/// Initialise the global logger.
///
/// `RUST_LOG` takes precedence over `default_filter`. The log file is opened
/// in append mode, so consecutive runs accumulate.
pub fn init(log_file: Option<&Path>, default_filter: &str) -> PipelineResult<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            buf.timestamp_millis(),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = open_log_file(path)?;
        builder.target(Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))));
    }

    builder
        .try_init()
        .map_err(|e| PipelineError::Logging(e.to_string()))
}
