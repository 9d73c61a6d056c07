use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::tile::Tile;

/// Highest zoom level accepted for an area.
pub const MAX_ZOOM: u8 = 22;

/// A bounding box given by its south-west and north-east corners in degrees.
///
/// # Example
/// ```rust
/// # use offline_tiles::BoundingBox;
/// let altai = BoundingBox::new(50.0, 86.0, 51.0, 87.5).unwrap();
/// assert_eq!(altai.tile_count(8, 8), 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its minimum (south-west) and maximum
    /// (north-east) coordinates.
    ///
    /// Latitudes must lie in [-90, 90], longitudes in [-180, 180] and the
    /// minimum corner must not lie north or east of the maximum one.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self> {
        for lat in [south, north] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(Error::InvalidArea(format!("latitude {} outside [-90, 90]", lat)));
            }
        }
        for lon in [west, east] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(Error::InvalidArea(format!("longitude {} outside [-180, 180]", lon)));
            }
        }
        if south > north {
            return Err(Error::InvalidArea(format!(
                "south latitude {} is north of {}",
                south, north
            )));
        }
        if west > east {
            return Err(Error::InvalidArea(format!(
                "west longitude {} is east of {}",
                west, east
            )));
        }

        Ok(BoundingBox {
            south,
            west,
            north,
            east,
        })
    }

    /// The covering tile ranges `(x_min..=x_max, y_min..=y_max)` at `zoom`.
    ///
    /// Tile rows grow southwards, so the south-west corner yields the
    /// largest row and the north-east corner the smallest.
    pub fn tile_range(&self, zoom: u8) -> ((usize, usize), (usize, usize)) {
        let sw = Tile::from_lat_lon(self.south, self.west, zoom);
        let ne = Tile::from_lat_lon(self.north, self.east, zoom);

        ((sw.x, ne.x), (ne.y, sw.y))
    }

    /// Creates an iterator iterating over all tiles in the bounding box, zoom
    /// level by zoom level.
    ///
    /// Each zoom level contributes the full rectangular grid between the two
    /// corner tiles.
    pub fn tiles(&self, min_zoom: u8, max_zoom: u8) -> impl Iterator<Item = Tile> + Debug {
        let bbox = *self;

        (min_zoom..=max_zoom).flat_map(move |zoom| {
            let ((x_min, x_max), (y_min, y_max)) = bbox.tile_range(zoom);

            (x_min..=x_max).flat_map(move |x| (y_min..=y_max).map(move |y| Tile::new(x, y, zoom)))
        })
    }

    /// Number of tiles [`tiles`](Self::tiles) yields, computed without
    /// enumerating them.
    pub fn tile_count(&self, min_zoom: u8, max_zoom: u8) -> usize {
        (min_zoom..=max_zoom)
            .map(|zoom| {
                let ((x_min, x_max), (y_min, y_max)) = self.tile_range(zoom);
                (x_max + 1).saturating_sub(x_min) * (y_max + 1).saturating_sub(y_min)
            })
            .sum()
    }
}

/// A bounding box together with the zoom levels to cover it at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Area {
    pub bounding_box: BoundingBox,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Area {
    pub fn new(bounding_box: BoundingBox, min_zoom: u8, max_zoom: u8) -> Result<Self> {
        if min_zoom > max_zoom {
            return Err(Error::InvalidArea(format!(
                "minimum zoom {} exceeds maximum zoom {}",
                min_zoom, max_zoom
            )));
        }
        if max_zoom > MAX_ZOOM {
            return Err(Error::InvalidArea(format!(
                "zoom {} exceeds the maximum of {}",
                max_zoom, MAX_ZOOM
            )));
        }

        Ok(Area {
            bounding_box,
            min_zoom,
            max_zoom,
        })
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + Debug {
        self.bounding_box.tiles(self.min_zoom, self.max_zoom)
    }

    pub fn tile_count(&self) -> usize {
        self.bounding_box.tile_count(self.min_zoom, self.max_zoom)
    }
}

/// A bounding box preset containing coordinates and a sensible zoom range
/// for a known geographic region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Preset {
    AltaiSmall,
    AltaiLarge,
    Crimea,
    Baikal,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::AltaiSmall,
        Preset::AltaiLarge,
        Preset::Crimea,
        Preset::Baikal,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Preset::AltaiSmall => "Altai mountains (small area)",
            Preset::AltaiLarge => "Altai mountains (extended area)",
            Preset::Crimea => "Crimea",
            Preset::Baikal => "Lake Baikal",
        }
    }

    /// Bounds as `(south, west, north, east)`.
    fn bounds(self) -> (f64, f64, f64, f64) {
        match self {
            Preset::AltaiSmall => (50.0, 86.0, 51.0, 87.5),
            Preset::AltaiLarge => (49.5, 85.0, 51.5, 88.5),
            Preset::Crimea => (44.4, 33.5, 45.5, 36.5),
            Preset::Baikal => (51.5, 103.5, 53.5, 107.5),
        }
    }

    pub fn zoom_range(self) -> (u8, u8) {
        match self {
            Preset::AltaiSmall | Preset::Crimea => (8, 12),
            Preset::AltaiLarge => (7, 11),
            Preset::Baikal => (8, 11),
        }
    }

    pub fn bounding_box(self) -> BoundingBox {
        let (south, west, north, east) = self.bounds();
        BoundingBox {
            south,
            west,
            north,
            east,
        }
    }

    pub fn area(self) -> Area {
        let (min_zoom, max_zoom) = self.zoom_range();
        Area {
            bounding_box: self.bounding_box(),
            min_zoom,
            max_zoom,
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use Preset::*;

        match s.to_lowercase().as_str() {
            "altai" | "altai-small" => Ok(AltaiSmall),
            "altai-large" => Ok(AltaiLarge),
            "crimea" => Ok(Crimea),
            "baikal" => Ok(Baikal),
            _ => Err("unrecognized preset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altai_zoom_8_grid() {
        let bbox = BoundingBox::new(50.0, 86.0, 51.0, 87.5).unwrap();
        assert_eq!(bbox.tile_range(8), ((189, 190), (85, 86)));

        let tiles: Vec<_> = bbox.tiles(8, 8).collect();
        assert_eq!(
            tiles,
            vec![
                Tile::new(189, 85, 8),
                Tile::new(189, 86, 8),
                Tile::new(190, 85, 8),
                Tile::new(190, 86, 8),
            ]
        );
    }

    #[test]
    fn count_matches_enumeration() {
        for preset in Preset::ALL {
            let area = preset.area();
            assert_eq!(area.tile_count(), area.tiles().count(), "{:?}", preset);
        }
    }

    #[test]
    fn preset_sizes() {
        assert_eq!(Preset::AltaiSmall.area().tile_count(), 475);
        assert_eq!(Preset::AltaiLarge.area().tile_count(), 531);
        assert_eq!(Preset::Crimea.area().tile_count(), 911);
        assert_eq!(Preset::Baikal.area().tile_count(), 652);
    }

    #[test]
    fn point_box_is_single_tile_per_zoom() {
        let bbox = BoundingBox::new(10.0, 10.0, 10.0, 10.0).unwrap();
        assert_eq!(bbox.tile_count(0, 5), 6);
    }

    #[test]
    fn rejects_invalid_boxes() {
        assert!(BoundingBox::new(91.0, 0.0, 92.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, -181.0, 1.0, 1.0).is_err());
        assert!(BoundingBox::new(2.0, 0.0, 1.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 2.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn rejects_inverted_zoom() {
        let bbox = Preset::Crimea.bounding_box();
        assert!(matches!(Area::new(bbox, 9, 8), Err(Error::InvalidArea(_))));
        assert!(matches!(Area::new(bbox, 8, 23), Err(Error::InvalidArea(_))));
        assert!(Area::new(bbox, 0, 0).is_ok());
    }

    #[test]
    fn parses_presets() {
        assert_eq!("Crimea".parse::<Preset>(), Ok(Preset::Crimea));
        assert_eq!("altai".parse::<Preset>(), Ok(Preset::AltaiSmall));
        assert!("atlantis".parse::<Preset>().is_err());
    }
}
