use std::path::PathBuf;

use thiserror::Error;

use crate::metainfo::MetainfoError;

/// Why a `make` run did not produce a metainfo file.
#[derive(Debug, Error)]
pub enum MakeError {
    /// The engine rejected the configuration. Nothing was rendered.
    #[error("error creating a batch: {0}")]
    Submit(#[source] MetainfoError),

    /// The output file could not be created. Nothing was rendered.
    #[error("error creating \"{}\": {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The hash job reported a failure through its completion signal.
    #[error("{0}")]
    Build(#[source] MetainfoError),

    /// The hash job went away without reporting an outcome.
    #[error("hash job ended without reporting a result")]
    Aborted,
}

impl MakeError {
    /// Whether progress reporting had already begun when this error
    /// occurred, leaving a partial progress line on the terminal.
    pub fn during_build(&self) -> bool {
        matches!(self, MakeError::Build(_) | MakeError::Aborted)
    }
}
