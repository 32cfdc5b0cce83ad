//! Batch tile loading.
//!
//! A [`TileLoader`] is anchored on one geographic position, zoom level and
//! tile source. Each call to [`TileLoader::start`] launches a batch: the
//! square window of tiles around the center tile is enumerated row by row,
//! cached tiles are adopted on the spot, and the rest are fetched
//! concurrently. The consumer pumps [`TileLoader::next_event`] to observe
//! progress and to drive tile state forward:
//!
//! ```text
//!   start()
//!     |
//!     v
//!   enumerate window ---- cached ----> Loaded
//!     |
//!     '--- miss ---> Pending --- image ---> Loaded
//!                       |
//!                       '------ error ----> Failed
//!
//!   all tiles settled => Finished (once)
//! ```
//!
//! Batches supersede each other: restarting aborts every in-flight request
//! of the old batch, and replies addressed to it are dropped unseen.

mod batch;
mod config;
mod core;
mod events;
mod tile;

pub use config::{LoaderConfig, DEFAULT_BLOCKS};
pub use core::{LoaderError, TileLoader};
pub use events::LoaderEvent;
pub use tile::{Tile, TileState};
