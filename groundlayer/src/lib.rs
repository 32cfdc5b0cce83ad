//! groundlayer - Slippy-map tile fetching and caching
//!
//! This library loads square batches of Web-Mercator map tiles around a
//! geographic position: resolve the center tile, enumerate a window of
//! tiles around it, serve what the on-disk cache already has, and fetch
//! the rest concurrently over HTTP. It is the imagery backend for tools
//! that drape ground imagery under some other scene and only need tiles
//! delivered, decoded, and cached.
//!
//! # Example
//!
//! ```ignore
//! use groundlayer::fetch::{FetcherConfig, ReqwestFetcher};
//! use groundlayer::loader::{LoaderConfig, LoaderEvent, TileLoader};
//!
//! let fetcher = ReqwestFetcher::new(&FetcherConfig::default())?;
//! let config = LoaderConfig::new(
//!     "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
//!     48.8584,
//!     2.2945,
//!     16,
//! )
//! .with_blocks(2);
//!
//! let mut loader = TileLoader::new(config, fetcher)?;
//! loader.start();
//! while let Some(event) = loader.next_event().await {
//!     if let LoaderEvent::Finished = event {
//!         break;
//!     }
//! }
//! for tile in loader.tiles() {
//!     // hand tile.image() to the renderer
//! }
//! ```

pub mod cache;
pub mod coord;
pub mod fetch;
pub mod loader;
pub mod logging;
pub mod source;

/// Version of the groundlayer library and CLI.
///
/// Synchronized across the workspace; defined in `Cargo.toml` and injected
/// at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
