use maplit::hashmap;
use std::fmt;
use strfmt::strfmt;

use crate::error::TileError;
use crate::tile::Tile;

/// A tile URL template with the replacement specifiers `{x}`, `{y}` and `{z}`.
///
/// The specifiers may appear in any order; some providers address tiles as
/// `{z}/{y}/{x}`.
#[derive(Clone, PartialEq, Eq)]
pub struct UrlFormat {
    format_str: String,
}

impl UrlFormat {
    pub fn new(format_str: impl Into<String>) -> Self {
        Self {
            format_str: format_str.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.format_str
    }

    pub fn tile_url(&self, tile: &Tile) -> Result<String, TileError> {
        let vars = hashmap! {
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "z".to_owned() => tile.z.to_string(),
        };

        strfmt(&self.format_str, &vars).map_err(|e| TileError::Url(e.to_string()))
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlFormat")
            .field("format_str", &self.format_str)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_template_order() {
        let fmt = UrlFormat::new("https://example.org/{z}/{y}/{x}");
        let url = fmt.tile_url(&Tile::new(3, 2, 5)).unwrap();
        assert_eq!(url, "https://example.org/5/2/3");
    }

    #[test]
    fn unknown_specifier_is_an_error() {
        let fmt = UrlFormat::new("https://{s}.example.org/{z}/{x}/{y}.png");
        assert!(matches!(
            fmt.tile_url(&Tile::new(0, 0, 0)),
            Err(TileError::Url(_))
        ));
    }
}
