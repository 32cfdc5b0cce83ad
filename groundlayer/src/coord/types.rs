//! Types shared by the tile coordinate math.

use std::fmt;

use thiserror::Error;

/// Highest zoom level the grid math supports. The grid has `2^zoom` tiles
/// per axis, so indices at this zoom still fit the tile coordinate type.
pub const MAX_ZOOM: u32 = 31;

/// Northern edge of the Web-Mercator domain, in degrees.
pub const MAX_LATITUDE: f64 = 85.0511;

/// Southern edge of the Web-Mercator domain, in degrees.
pub const MIN_LATITUDE: f64 = -85.0511;

/// Eastern edge of the longitude domain, in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Western edge of the longitude domain, in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;

/// Identifies a single tile on the slippy-map grid.
///
/// `x` grows eastward from the antimeridian, `y` grows southward from the
/// north edge of the projection, and `z` is the zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// The tile under a geographic position, plus where inside that tile the
/// position sits.
///
/// Offsets are fractions of one tile in `[0, 1)`, measured from the tile's
/// north-west corner. A renderer uses them to place imagery so the requested
/// position lands exactly where it should, rather than snapping to a tile
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterTile {
    pub x: u32,
    pub y: u32,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Geographic input the projection cannot represent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("zoom level {0} exceeds the maximum of {MAX_ZOOM}")]
    ZoomTooHigh(u32),

    #[error("latitude {0} is outside the Web-Mercator domain [{MIN_LATITUDE}, {MAX_LATITUDE}]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [{MIN_LONGITUDE}, {MAX_LONGITUDE}]")]
    LongitudeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_coord_displays_zoom_first() {
        let coord = TileCoord::new(19295, 24640, 16);
        assert_eq!(coord.to_string(), "16/19295/24640");
    }

    #[test]
    fn tile_coords_compare_by_value() {
        assert_eq!(TileCoord::new(5, 5, 4), TileCoord::new(5, 5, 4));
        assert_ne!(TileCoord::new(5, 5, 4), TileCoord::new(5, 5, 5));
    }

    #[test]
    fn coord_error_names_the_offending_value() {
        let error = CoordError::LatitudeOutOfRange(86.0);
        assert!(error.to_string().contains("86"));
    }
}
