use std::{fmt, str::FromStr};

use crate::error::Error;
use crate::url::UrlFormat;

/// The tile providers tiles can be fetched from.
///
/// Each source knows its URL template and the extension its tiles are
/// stored with. The name doubles as the top-level directory in the store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TileSource {
    Terrain,
    Satellite,
    Osm,
}

impl TileSource {
    pub const ALL: [TileSource; 3] = [TileSource::Terrain, TileSource::Satellite, TileSource::Osm];

    pub fn name(self) -> &'static str {
        match self {
            TileSource::Terrain => "terrain",
            TileSource::Satellite => "satellite",
            TileSource::Osm => "osm",
        }
    }

    /// The provider URL template. The satellite provider addresses tiles
    /// row-first.
    pub fn url_template(self) -> &'static str {
        match self {
            TileSource::Terrain => "https://tile.opentopomap.org/{z}/{x}/{y}.png",
            TileSource::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            TileSource::Osm => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        }
    }

    pub fn url_format(self) -> UrlFormat {
        UrlFormat::new(self.url_template())
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            TileSource::Satellite => ".jpg",
            TileSource::Terrain | TileSource::Osm => ".png",
        }
    }
}

impl fmt::Display for TileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TileSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileSource::ALL
            .iter()
            .copied()
            .find(|source| source.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownSource(s.to_owned()))
    }
}
