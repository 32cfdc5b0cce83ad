//! On-disk tile cache.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::cache::path::{namespace_dir, tile_file_name};
use crate::cache::types::CacheError;
use crate::coord::TileCoord;

/// Flat directory of JPEG tiles for a single source.
///
/// Reads and writes are synchronous and best-effort: a missing, unreadable
/// or corrupt file is reported as a miss, and a failed write is logged and
/// dropped. The cache never evicts; tiles accumulate until the user clears
/// the directory.
#[derive(Debug, Clone)]
pub struct TileCache {
    root: PathBuf,
}

impl TileCache {
    /// Opens (and creates, if needed) the cache namespace for one source.
    ///
    /// # Errors
    ///
    /// Fails when the namespace directory cannot be created, which leaves
    /// nothing on disk worth keeping.
    pub fn new(base: &Path, namespace_key: u64) -> Result<Self, CacheError> {
        let root = namespace_dir(base, namespace_key);
        std::fs::create_dir_all(&root).map_err(|source| CacheError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        debug!(root = %root.display(), "tile cache ready");
        Ok(Self { root })
    }

    /// Directory holding this source's tiles.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path a tile would occupy, whether or not it is cached yet.
    pub fn path_for(&self, coord: TileCoord) -> PathBuf {
        self.root.join(tile_file_name(coord))
    }

    /// Loads a cached tile, or `None` when the tile is absent or unreadable.
    pub fn load(&self, coord: TileCoord) -> Option<DynamicImage> {
        let path = self.path_for(coord);
        if !path.exists() {
            return None;
        }
        match image::open(&path) {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    %error,
                    "cached tile is unreadable, treating as a miss"
                );
                None
            }
        }
    }

    /// Persists a tile as JPEG. Failures are logged and swallowed; the
    /// caller keeps the in-memory image either way.
    pub fn store(&self, coord: TileCoord, image: &DynamicImage) {
        let path = self.path_for(coord);
        // JPEG has no alpha channel, so flatten before encoding.
        if let Err(error) = image.to_rgb8().save_with_format(&path, ImageFormat::Jpeg) {
            warn!(
                path = %path.display(),
                %error,
                "failed to cache tile, keeping it in memory only"
            );
        }
    }
}
