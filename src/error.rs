use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a single tile could not be stored. Recorded in the fetch summary,
/// never fatal to the batch.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("server answered {0}")]
    Status(u16),

    #[error("failed formatting URL: {0}")]
    Url(String),

    #[error("failed writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that stop a fetch or serve operation as a whole.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tile source `{0}` (expected terrain, satellite or osm)")]
    UnknownSource(String),

    #[error("invalid area: {0}")]
    InvalidArea(String),

    #[error("fetching {total} tiles was declined")]
    Declined { total: usize },

    #[error("interrupted")]
    Interrupted,

    #[error("failed preparing output directory {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed creating HTTP client: {0}")]
    Client(String),

    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
