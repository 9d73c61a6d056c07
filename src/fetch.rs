use futures::{prelude::*, stream};
use std::{fmt, sync::Arc, time::Duration};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bounding_box::Area;
use crate::client::{HttpTileClient, TileClient};
use crate::config::Config;
use crate::error::{Error, Result, TileError};
use crate::source::TileSource;
use crate::store::TileStore;
use crate::tile::Tile;
use crate::url::UrlFormat;

/// Progress is reported every this many completed tiles.
pub const PROGRESS_INTERVAL: usize = 10;

/// Decides whether a job of the given size may proceed.
pub type ConfirmFn = Arc<dyn Fn(usize) -> bool + Send + Sync>;

/// Receives cumulative progress while a job runs.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// A single tile to fetch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchTask {
    pub source: TileSource,
    pub tile: Tile,
    pub delay: Duration,
}

/// What happened to a single tile.
#[derive(Debug)]
pub enum FetchOutcome {
    Downloaded,
    /// The tile was already in the store.
    Skipped,
    Failed(TileError),
}

/// Per-outcome tile counts of a job.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchSummary {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded => self.downloaded += 1,
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "downloaded: {}, skipped: {}, failed: {}",
            self.downloaded, self.skipped, self.failed
        )
    }
}

/// Snapshot handed to the progress callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub source: TileSource,
    pub completed: usize,
    pub total: usize,
    pub summary: FetchSummary,
}

/// Fetches the tiles of an area into a [`TileStore`].
///
/// Tiles already present in the store are skipped without touching the
/// network, so re-running an interrupted or partially failed job only
/// fetches what is missing.
///
/// # Example
/// ```rust,no_run
/// use offline_tiles::{Area, BoundingBox, Config, Fetcher, TileSource};
///
/// # #[tokio::main]
/// # async fn main() {
/// let bbox = BoundingBox::new(50.0, 86.0, 51.0, 87.5).unwrap();
/// let area = Area::new(bbox, 8, 10).unwrap();
///
/// let fetcher = Fetcher::new(Config::default()).expect("failed creating fetcher");
/// let summary = fetcher
///     .fetch_area(&area, TileSource::Osm)
///     .await
///     .expect("failed fetching tiles");
/// println!("{}", summary);
/// # }
/// ```
pub struct Fetcher<C> {
    config: Config,
    store: TileStore,
    client: C,
    confirm: ConfirmFn,
    progress: Option<ProgressFn>,
    cancel: CancellationToken,
}

impl Fetcher<HttpTileClient> {
    /// Creates a fetcher talking to the tile providers over HTTP.
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpTileClient::new(config.timeout)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: TileClient> Fetcher<C> {
    /// Creates a fetcher using the given client.
    ///
    /// Large jobs are declined until a confirmation callback is set with
    /// [`on_large_job`](Self::on_large_job).
    pub fn with_client(config: Config, client: C) -> Self {
        Self {
            store: config.store(),
            config,
            client,
            confirm: Arc::new(|_: usize| false),
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the callback consulted before jobs larger than
    /// [`Config::large_job_threshold`]. It receives the tile count and may
    /// block, e.g. on user input.
    pub fn on_large_job(
        mut self,
        confirm: impl Fn(usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.confirm = Arc::new(confirm);
        self
    }

    pub fn on_progress(mut self, progress: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Ties the fetcher to `token`; cancelling it aborts the running job.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    /// Fetches every tile covering `area` from `source`.
    ///
    /// Individual tile failures are counted, never fatal. The job as a whole
    /// fails only if the large-job confirmation is declined (nothing has
    /// been touched at that point), if the output folder can't be created,
    /// or if it is cancelled, in which case no summary is produced.
    pub async fn fetch_area(&self, area: &Area, source: TileSource) -> Result<FetchSummary> {
        let total = area.tile_count();

        info!(
            %source,
            total,
            min_zoom = area.min_zoom,
            max_zoom = area.max_zoom,
            workers = self.config.max_workers,
            delay_ms = self.config.delay.as_millis() as u64,
            "fetching area"
        );

        if total > self.config.large_job_threshold && !self.confirm_large_job(total).await? {
            info!(%source, total, "large job declined");
            return Err(Error::Declined { total });
        }

        let root = self.store.root();
        fs::create_dir_all(root).await.map_err(|e| Error::Output {
            path: root.to_owned(),
            source: e,
        })?;

        let url_fmt = source.url_format();
        let delay = self.config.delay;
        let tasks = area.tiles().map(|tile| FetchTask {
            source,
            tile,
            delay,
        });

        let mut outcomes = stream::iter(tasks)
            .map(|task| self.run_task(task, &url_fmt))
            .buffer_unordered(self.config.max_workers.max(1));

        let mut summary = FetchSummary::default();
        loop {
            let (task, outcome) = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(%source, completed = summary.completed(), total, "fetch interrupted");
                    return Err(Error::Interrupted);
                }
                next = outcomes.next() => match next {
                    Some(next) => next,
                    None => break,
                },
            };

            if let FetchOutcome::Failed(e) = &outcome {
                warn!(%source, tile = %task.tile, error = %e, "failed fetching tile");
            }
            summary.record(&outcome);

            let completed = summary.completed();
            if completed % PROGRESS_INTERVAL == 0 || completed == total {
                if let Some(progress) = &self.progress {
                    progress(&Progress {
                        source,
                        completed,
                        total,
                        summary,
                    });
                }
            }
        }

        info!(%source, %summary, "fetch finished");

        Ok(summary)
    }

    /// Fetches `area` from each source in turn, returning one summary per
    /// source.
    pub async fn fetch_sources(
        &self,
        area: &Area,
        sources: &[TileSource],
    ) -> Result<Vec<(TileSource, FetchSummary)>> {
        let mut summaries = Vec::with_capacity(sources.len());
        for &source in sources {
            summaries.push((source, self.fetch_area(area, source).await?));
        }

        Ok(summaries)
    }

    async fn confirm_large_job(&self, total: usize) -> Result<bool> {
        let confirm = Arc::clone(&self.confirm);
        let answer = tokio::task::spawn_blocking(move || confirm(total));

        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Interrupted),
            answer = answer => match answer {
                Ok(answer) => Ok(answer),
                Err(e) => {
                    warn!(total, error = %e, "large job confirmation failed, declining");
                    Ok(false)
                }
            },
        }
    }

    async fn run_task(&self, task: FetchTask, url_fmt: &UrlFormat) -> (FetchTask, FetchOutcome) {
        let outcome = self
            .fetch_tile(&task, url_fmt)
            .await
            .unwrap_or_else(FetchOutcome::Failed);

        (task, outcome)
    }

    async fn fetch_tile(
        &self,
        task: &FetchTask,
        url_fmt: &UrlFormat,
    ) -> Result<FetchOutcome, TileError> {
        // if the tile's already been downloaded, skip it
        if self.store.contains(task.source, &task.tile).await {
            debug!(source = %task.source, tile = %task.tile, "tile present, skipping");
            return Ok(FetchOutcome::Skipped);
        }

        let url = url_fmt.tile_url(&task.tile)?;

        tokio::time::sleep(task.delay).await;

        let body = self.client.get(&url).await?;
        let path = self.store.write(task.source, &task.tile, &body).await?;
        debug!(%url, path = %path.display(), "stored tile");

        Ok(FetchOutcome::Downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = FetchSummary::default();
        summary.record(&FetchOutcome::Downloaded);
        summary.record(&FetchOutcome::Skipped);
        summary.record(&FetchOutcome::Skipped);
        summary.record(&FetchOutcome::Failed(TileError::Status(404)));

        assert_eq!(
            summary,
            FetchSummary {
                downloaded: 1,
                skipped: 2,
                failed: 1
            }
        );
        assert_eq!(summary.completed(), 4);
        assert_eq!(summary.to_string(), "downloaded: 1, skipped: 2, failed: 1");
    }
}
