//! Web-Mercator tile coordinate math.
//!
//! Converts geographic positions (latitude/longitude in degrees) into
//! slippy-map tile coordinates at a given zoom level. At zoom `z` the world
//! is a `2^z` by `2^z` grid; tile `(0, 0)` sits at the north-west corner and
//! `y` grows southward.
//!
//! All entry points validate their input against the projection domain and
//! refuse positions the projection cannot represent, rather than returning
//! tiles that do not exist.

mod types;

pub use types::{
    CenterTile, CoordError, TileCoord, MAX_LATITUDE, MAX_LONGITUDE, MAX_ZOOM, MIN_LATITUDE,
    MIN_LONGITUDE,
};

use std::f64::consts::PI;

/// Ground resolution at the equator for zoom 0, in metres per pixel, assuming
/// the conventional 256-pixel tile.
const EQUATOR_RESOLUTION: f64 = 156_543.034;

/// Projects a geographic position onto the fractional tile grid.
///
/// Returns `(x, y)` where the integer parts select a tile and the fractional
/// parts locate the position within it. `x` spans `[0, 2^zoom]` west to east
/// and `y` spans `[0, 2^zoom]` north to south.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, within the Web-Mercator domain
/// * `lon` - Longitude in degrees, `[-180, 180]`
/// * `zoom` - Zoom level, at most [`MAX_ZOOM`]
///
/// # Errors
///
/// Fails when the zoom exceeds [`MAX_ZOOM`] or the position lies outside the
/// projection domain.
pub fn project(lat: f64, lon: f64, zoom: u32) -> Result<(f64, f64), CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::ZoomTooHigh(zoom));
    }
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return Err(CoordError::LatitudeOutOfRange(lat));
    }
    if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
        return Err(CoordError::LongitudeOutOfRange(lon));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = lat.to_radians();
    let x = n * (lon + 180.0) / 360.0;
    let y = n * (1.0 - lat_rad.tan().asinh() / PI) / 2.0;
    Ok((x, y))
}

/// Resolves the tile under a geographic position along with the fractional
/// offset of the position inside that tile.
///
/// This is the anchor for a tile batch: the loader enumerates its window
/// around the returned tile, and a renderer uses the offsets to align the
/// assembled imagery with the requested position.
pub fn center_tile(lat: f64, lon: f64, zoom: u32) -> Result<CenterTile, CoordError> {
    let (x, y) = project(lat, lon, zoom)?;
    let tile_x = x.floor();
    let tile_y = y.floor();
    Ok(CenterTile {
        x: tile_x as u32,
        y: tile_y as u32,
        offset_x: x - tile_x,
        offset_y: y - tile_y,
    })
}

/// Reports whether a geographic position still falls inside a previously
/// resolved center tile.
///
/// Cheap re-validation for callers tracking a moving position: as long as
/// the position stays inside the tile, the batch anchored on it remains
/// valid and there is nothing to re-fetch.
pub fn inside_center_tile(
    lat: f64,
    lon: f64,
    zoom: u32,
    center: &CenterTile,
) -> Result<bool, CoordError> {
    let (x, y) = project(lat, lon, zoom)?;
    Ok(x.floor() as u32 == center.x && y.floor() as u32 == center.y)
}

/// Ground resolution in metres per pixel at the given latitude and zoom.
///
/// Callers are expected to pass a latitude inside the projection domain and
/// a zoom no greater than [`MAX_ZOOM`]; out-of-domain input degrades the
/// result rather than failing.
pub fn resolution(lat: f64, zoom: u32) -> f64 {
    EQUATOR_RESOLUTION * lat.to_radians().cos() / 2.0_f64.powi(zoom as i32)
}

/// Largest valid tile index along either axis at the given zoom.
///
/// `zoom` must be at most [`MAX_ZOOM`].
pub fn max_tile_index(zoom: u32) -> u32 {
    debug_assert!(zoom <= MAX_ZOOM);
    (1u32 << zoom.min(MAX_ZOOM)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_the_equator_origin_onto_the_grid_midpoint() {
        let (x, y) = project(0.0, 0.0, 1).expect("origin should project");
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn projects_new_york_at_street_zoom() {
        let (x, y) = project(40.7128, -74.0060, 16).expect("NYC should project");
        assert_eq!(x.floor() as u32, 19295);
        assert_eq!(y.floor() as u32, 24640);
    }

    #[test]
    fn rejects_latitude_beyond_the_mercator_domain() {
        assert_eq!(
            project(86.0, 0.0, 4),
            Err(CoordError::LatitudeOutOfRange(86.0))
        );
        assert_eq!(
            project(-85.06, 0.0, 4),
            Err(CoordError::LatitudeOutOfRange(-85.06))
        );
    }

    #[test]
    fn rejects_longitude_beyond_the_antimeridian() {
        assert_eq!(
            project(0.0, 180.5, 4),
            Err(CoordError::LongitudeOutOfRange(180.5))
        );
    }

    #[test]
    fn rejects_zoom_beyond_the_grid_limit() {
        assert_eq!(project(0.0, 0.0, 32), Err(CoordError::ZoomTooHigh(32)));
    }

    #[test]
    fn accepts_the_domain_edges() {
        assert!(project(MAX_LATITUDE, MAX_LONGITUDE, 4).is_ok());
        assert!(project(MIN_LATITUDE, MIN_LONGITUDE, 4).is_ok());
    }

    #[test]
    fn center_tile_at_the_origin_has_zero_offsets() {
        let center = center_tile(0.0, 0.0, 1).expect("origin should resolve");
        assert_eq!(center.x, 1);
        assert_eq!(center.y, 1);
        assert_eq!(center.offset_x, 0.0);
        assert_eq!(center.offset_y, 0.0);
    }

    #[test]
    fn center_tile_reports_the_offset_within_the_tile() {
        // At zoom 2 the grid is 4 wide, so longitude 45 projects to x = 2.5.
        let center = center_tile(0.0, 45.0, 2).expect("should resolve");
        assert_eq!(center.x, 2);
        assert_eq!(center.y, 2);
        assert!((center.offset_x - 0.5).abs() < 1e-9);
        assert_eq!(center.offset_y, 0.0);
    }

    #[test]
    fn positions_floor_back_into_their_own_center_tile() {
        let samples = [
            (0.0, 0.0, 1),
            (40.7128, -74.0060, 16),
            (-33.8688, 151.2093, 12),
            (MAX_LATITUDE, MAX_LONGITUDE, 6),
            (MIN_LATITUDE, MIN_LONGITUDE, 6),
        ];
        for (lat, lon, zoom) in samples {
            let center = center_tile(lat, lon, zoom).expect("sample should resolve");
            assert_eq!(
                inside_center_tile(lat, lon, zoom, &center),
                Ok(true),
                "({lat}, {lon}) @ z{zoom} left its own tile"
            );
        }
    }

    #[test]
    fn neighbouring_positions_fall_outside_the_center_tile() {
        let center = center_tile(0.0, 45.0, 2).expect("should resolve");
        // Longitude 100 projects to x ~ 3.1, one tile east of the center.
        assert_eq!(inside_center_tile(0.0, 100.0, 2, &center), Ok(false));
    }

    #[test]
    fn inside_center_tile_propagates_domain_errors() {
        let center = center_tile(0.0, 0.0, 4).expect("should resolve");
        assert!(inside_center_tile(86.0, 0.0, 4, &center).is_err());
    }

    #[test]
    fn resolution_matches_the_published_equator_value() {
        assert!((resolution(0.0, 0) - 156_543.034).abs() < 1e-3);
        assert!((resolution(0.0, 1) - 78_271.517).abs() < 1e-3);
    }

    #[test]
    fn resolution_halves_with_each_zoom_level() {
        let coarse = resolution(48.8566, 10);
        let fine = resolution(48.8566, 11);
        assert!((coarse / fine - 2.0).abs() < 1e-9);
    }

    #[test]
    fn resolution_shrinks_toward_the_poles() {
        assert!(resolution(85.0, 10) < resolution(0.0, 10));
    }

    #[test]
    fn max_tile_index_covers_the_grid() {
        assert_eq!(max_tile_index(0), 0);
        assert_eq!(max_tile_index(4), 15);
        assert_eq!(max_tile_index(MAX_ZOOM), (1u32 << 31) - 1);
    }
}
