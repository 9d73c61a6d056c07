use std::{f64::consts::PI, fmt};

/// Northernmost/southernmost latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.051_128_779_806_6;
pub const MIN_LAT: f64 = -MAX_LAT;

/// An OSM slippy-map tile with x, y and z-coordinate.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub z: u8,
}

impl Tile {
    pub fn new(x: usize, y: usize, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Computes the tile containing the given point (in degrees) at `zoom`.
    ///
    /// Latitudes beyond the Mercator limit are clamped to it and the resulting
    /// indices are clamped into the `2^zoom × 2^zoom` grid, so every finite
    /// input yields a valid tile. `lon = 180` maps onto the last column.
    ///
    /// # Example
    /// ```rust
    /// # use offline_tiles::Tile;
    /// let tile = Tile::from_lat_lon(50.7929, 6.0402, 18);
    /// assert_eq!((tile.x, tile.y), (135470, 87999));
    /// ```
    pub fn from_lat_lon(lat_deg: f64, lon_deg: f64, zoom: u8) -> Self {
        // scale factor
        let n = 2_f64.powi(zoom as i32);
        let lat_rad = lat_deg.clamp(MIN_LAT, MAX_LAT).to_radians();

        let x = (lon_deg + 180_f64) / 360_f64 * n;
        let y = (1_f64 - lat_rad.tan().asinh() / PI) / 2_f64 * n;

        let last = Self::grid_size(zoom) - 1;
        Self::new(clamp_index(x, last), clamp_index(y, last), zoom)
    }

    /// Number of tiles along one axis at `zoom`.
    pub fn grid_size(zoom: u8) -> usize {
        1usize.checked_shl(u32::from(zoom)).unwrap_or(usize::MAX)
    }

    /// The north-west corner of the tile in degrees (latitude, longitude).
    pub fn north_west(&self) -> (f64, f64) {
        let n = 2_f64.powi(self.z as i32);
        let lon = self.x as f64 / n * 360_f64 - 180_f64;
        let lat = (PI * (1_f64 - 2_f64 * self.y as f64 / n)).sinh().atan();

        (lat.to_degrees(), lon)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

// `as` saturates and maps NaN to 0.
fn clamp_index(v: f64, last: usize) -> usize {
    (v.floor() as usize).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tile_index() {
        let tile = Tile::from_lat_lon(50.7929, 6.0402, 18);
        assert_eq!((tile.x, tile.y), (135470, 87999));
    }

    #[test]
    fn new_york_at_zoom_16() {
        let tile = Tile::from_lat_lon(40.7128, -74.0060, 16);
        assert_eq!((tile.x, tile.y, tile.z), (19295, 24640, 16));
    }

    #[test]
    fn london_at_zoom_10() {
        let tile = Tile::from_lat_lon(51.5074, -0.1278, 10);
        assert_eq!((tile.x, tile.y), (511, 340));
    }

    #[test]
    fn zoom_zero_is_single_tile() {
        assert_eq!(Tile::from_lat_lon(60.0, 100.0, 0), Tile::new(0, 0, 0));
        assert_eq!(Tile::from_lat_lon(-60.0, -100.0, 0), Tile::new(0, 0, 0));
    }

    #[test]
    fn equator_prime_meridian_is_grid_center() {
        assert_eq!(Tile::from_lat_lon(0.0, 0.0, 1), Tile::new(1, 1, 1));
    }

    #[test]
    fn edges_are_clamped_into_grid() {
        assert_eq!(Tile::from_lat_lon(90.0, 180.0, 4), Tile::new(15, 0, 4));
        assert_eq!(Tile::from_lat_lon(-90.0, -180.0, 4), Tile::new(0, 15, 4));
        assert_eq!(Tile::from_lat_lon(f64::NAN, f64::NAN, 4), Tile::new(0, 0, 4));
    }

    #[test]
    fn north_west_corner_contains_origin_point() {
        let tile = Tile::from_lat_lon(40.7128, -74.0060, 16);
        let (lat, lon) = tile.north_west();

        assert!(lat >= 40.7128 && lat - 40.7128 < 0.01);
        assert!(lon <= -74.0060 && -74.0060 - lon < 0.01);
    }

    #[test]
    fn display_is_path_order() {
        assert_eq!(Tile::new(3, 2, 5).to_string(), "5/3/2");
    }

    proptest! {
        #[test]
        fn indices_stay_in_grid(lat in -84.99f64..84.99, lon in -180f64..=180.0, zoom in 0u8..=20) {
            let tile = Tile::from_lat_lon(lat, lon, zoom);
            let n = Tile::grid_size(zoom);
            prop_assert!(tile.x < n);
            prop_assert!(tile.y < n);
        }

        #[test]
        fn x_grows_with_longitude(lat in -84.0f64..84.0, a in -180f64..180.0, b in -180f64..180.0, zoom in 0u8..=18) {
            let (west, east) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Tile::from_lat_lon(lat, west, zoom).x <= Tile::from_lat_lon(lat, east, zoom).x);
        }

        #[test]
        fn y_shrinks_with_latitude(lon in -180f64..180.0, a in -84.0f64..84.0, b in -84.0f64..84.0, zoom in 0u8..=18) {
            let (south, north) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Tile::from_lat_lon(north, lon, zoom).y <= Tile::from_lat_lon(south, lon, zoom).y);
        }
    }
}
