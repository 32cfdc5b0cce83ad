//! Loader configuration.

use std::path::PathBuf;

/// Window radius used when the caller does not pick one.
pub const DEFAULT_BLOCKS: u32 = 3;

/// Settings for one [`TileLoader`](crate::loader::TileLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// URL template with `{x}`, `{y}` and `{z}` tokens.
    pub template: String,
    /// Latitude of the position to load around, in degrees.
    pub latitude: f64,
    /// Longitude of the position to load around, in degrees.
    pub longitude: f64,
    /// Zoom level of the batch.
    pub zoom: u32,
    /// Window radius in tiles around the center tile; a radius of `b`
    /// yields up to `(2b + 1)^2` tiles.
    pub blocks: u32,
    /// Base directory for the on-disk cache. The loader adds a per-source
    /// namespace underneath.
    pub cache_dir: PathBuf,
    /// Serve cached tiles only; tiles missing from the cache are skipped
    /// rather than fetched.
    pub offline: bool,
}

impl LoaderConfig {
    pub fn new(template: impl Into<String>, latitude: f64, longitude: f64, zoom: u32) -> Self {
        Self {
            template: template.into(),
            latitude,
            longitude,
            zoom,
            blocks: DEFAULT_BLOCKS,
            cache_dir: std::env::temp_dir().join("groundlayer"),
            offline: false,
        }
    }

    pub fn with_blocks(mut self, blocks: u32) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}
