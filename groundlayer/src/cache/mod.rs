//! Persistent tile cache.
//!
//! Every tile that arrives over the network is re-encoded as JPEG and kept
//! on disk so later batches (and offline sessions) can serve it without a
//! request. Each source gets its own namespace directory under the cache
//! base, keyed by the source's URL template, so switching providers never
//! mixes imagery.

mod disk;
mod path;
mod types;

pub use disk::TileCache;
pub use path::{namespace_dir, tile_file_name};
pub use types::CacheError;
