//! Cache path layout.
//!
//! Tiles live under `<base>/<namespace>/x{X}_y{Y}_z{Z}.jpg`, where the
//! namespace is a source's key rendered as fixed-width hex. Encoding the
//! full coordinate in the file name keeps every tile of a source in one
//! flat directory and makes individual files easy to inspect by hand.

use std::path::{Path, PathBuf};

use crate::coord::TileCoord;

/// File name for one cached tile.
///
/// ```
/// use groundlayer::cache::tile_file_name;
/// use groundlayer::coord::TileCoord;
///
/// assert_eq!(tile_file_name(TileCoord::new(5, 9, 4)), "x5_y9_z4.jpg");
/// ```
pub fn tile_file_name(coord: TileCoord) -> String {
    format!("x{}_y{}_z{}.jpg", coord.x, coord.y, coord.z)
}

/// Directory holding every cached tile of one source.
pub fn namespace_dir(base: &Path, namespace_key: u64) -> PathBuf {
    base.join(format!("{namespace_key:016x}"))
}
