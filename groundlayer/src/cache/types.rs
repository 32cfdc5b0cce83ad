//! Cache error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while preparing the on-disk cache.
///
/// Only setup can fail hard; individual tile reads and writes degrade to
/// cache misses and are never surfaced as errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateRoot { path: PathBuf, source: io::Error },
}
