use std::path::PathBuf;

use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors raised while submitting or running a metainfo build.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// Encoding the finished metainfo failed.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required part of the configuration is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A configuration value is unusable.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// An input file could not be inspected or read.
    #[error("error reading \"{}\": {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file changed size while it was being hashed.
    #[error("\"{}\" changed while hashing", .0.display())]
    FileChanged(PathBuf),

    /// A hashing worker panicked or was cancelled.
    #[error("hashing worker failed: {0}")]
    Worker(String),

    /// An I/O error occurred while writing the output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
