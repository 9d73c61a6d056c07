//! Download map tiles for an area to your disk and browse them offline.
//!
//! **Use with care.** Tile providers have usage policies; keep the number of
//! parallel fetches low and the delay between requests reasonable.
//!
//! # Usage
//!
//! The `offline-tiles` binary fetches tiles for a bounding box or one of a
//! few named presets, and serves the resulting tile tree over HTTP. It
//! features a helpful CLI you can access via `-h` / `--help`.
//!
//! It is also available as a library.
//!
//! # CLI Example
//!
//! ```bash
//! offline-tiles fetch \
//!   --south 50.0 --west 86.0 --north 51.0 --east 87.5 \
//!   --min-zoom 8 --max-zoom 12 \
//!   --source terrain --source satellite \
//!   --output ./tiles
//!
//! offline-tiles serve --root . --port 8000
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use offline_tiles::{Area, Config, Fetcher, Preset, TileSource};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     output_folder: "./tiles".into(),
//!     max_workers: 3,
//!     delay: Duration::from_millis(500),
//!     ..Config::default()
//! };
//!
//! let fetcher = Fetcher::new(config)
//!     .expect("failed creating fetcher")
//!     .on_large_job(|total| total < 5_000);
//!
//! let summary = fetcher
//!     .fetch_area(&Preset::Crimea.area(), TileSource::Terrain)
//!     .await
//!     .expect("failed fetching tiles");
//! println!("{}", summary);
//! # }
//! ```

mod bounding_box;
mod client;
mod config;
mod error;
mod fetch;
pub mod serve;
mod source;
mod store;
mod tile;
mod url;

pub use bounding_box::{Area, BoundingBox, Preset, MAX_ZOOM};
pub use client::{HttpTileClient, TileClient, USER_AGENT};
pub use config::{
    Config, DEFAULT_DELAY, DEFAULT_LARGE_JOB_THRESHOLD, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_FOLDER,
    DEFAULT_TIMEOUT,
};
pub use error::{Error, Result, TileError};
pub use fetch::{
    ConfirmFn, FetchOutcome, FetchSummary, FetchTask, Fetcher, Progress, ProgressFn,
    PROGRESS_INTERVAL,
};
pub use source::TileSource;
pub use store::TileStore;
pub use tile::{Tile, MAX_LAT, MIN_LAT};
pub use url::UrlFormat;

/// Re-exported so callers can cancel a running fetch.
pub use tokio_util::sync::CancellationToken;
