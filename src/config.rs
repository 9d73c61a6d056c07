use std::{path::PathBuf, time::Duration};

use crate::store::TileStore;

pub const DEFAULT_OUTPUT_FOLDER: &str = "tiles";
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LARGE_JOB_THRESHOLD: usize = 1000;

/// Tile fetching configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The folder the tile tree is stored in.
    pub output_folder: PathBuf,

    /// Maximum number of parallel downloads.
    pub max_workers: usize,

    /// Pause before every request that actually hits the network.
    pub delay: Duration,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Jobs with more tiles than this need explicit confirmation.
    pub large_job_threshold: usize,
}

impl Config {
    pub fn store(&self) -> TileStore {
        TileStore::new(self.output_folder.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_folder: PathBuf::from(DEFAULT_OUTPUT_FOLDER),
            max_workers: DEFAULT_MAX_WORKERS,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            large_job_threshold: DEFAULT_LARGE_JOB_THRESHOLD,
        }
    }
}
