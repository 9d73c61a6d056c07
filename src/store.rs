use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::error::TileError;
use crate::source::TileSource;
use crate::tile::Tile;

/// The on-disk tile tree, laid out as `{root}/{source}/{z}/{x}/{y}{ext}`.
///
/// The file system is the only record of which tiles are present; there is
/// no index or in-memory cache, so the downloader and the server always
/// agree on what exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all tiles of `source`.
    pub fn source_dir(&self, source: TileSource) -> PathBuf {
        self.root.join(source.name())
    }

    pub fn tile_path(&self, source: TileSource, tile: &Tile) -> PathBuf {
        let mut target = self.source_dir(source);
        target.push(tile.z.to_string());
        target.push(tile.x.to_string());
        target.push(format!("{}{}", tile.y, source.extension()));

        target
    }

    /// Whether the tile has already been stored.
    ///
    /// Errors while probing count as absent; the subsequent write reports
    /// them properly.
    pub async fn contains(&self, source: TileSource, tile: &Tile) -> bool {
        fs::try_exists(self.tile_path(source, tile))
            .await
            .unwrap_or(false)
    }

    /// Stores `data` as the tile's file, creating directories as needed.
    ///
    /// The bytes are written to a temporary sibling first and renamed into
    /// place, so an aborted write never leaves a truncated tile behind.
    pub async fn write(
        &self,
        source: TileSource,
        tile: &Tile,
        data: &[u8],
    ) -> Result<PathBuf, TileError> {
        let path = self.tile_path(source, tile);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(io_err(dir))?;
        }

        let temp_path = path.with_extension("part");
        fs::write(&temp_path, data).await.map_err(io_err(&temp_path))?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_err(&path)(e));
        }

        Ok(path)
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> TileError {
    let path = path.to_owned();
    move |source| TileError::Io { path, source }
}
