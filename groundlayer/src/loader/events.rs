//! Loader progress events.

use crate::coord::TileCoord;
use crate::fetch::FetchError;

/// Progress notification from a running batch.
///
/// Events arrive through
/// [`TileLoader::next_event`](crate::loader::TileLoader::next_event) in
/// order: a tile's `RequestIssued` precedes any of its redirects, which
/// precede its terminal `ImageReceived` or `TileFailed`. `Finished` arrives
/// exactly once per batch, after every tile has settled.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// A network request went out for a tile that was not cached.
    RequestIssued { coord: TileCoord, url: String },
    /// A tile arrived, decoded, and joined the batch.
    ImageReceived { coord: TileCoord, url: String },
    /// A tile will not load in this batch.
    TileFailed { coord: TileCoord, message: String },
    /// A tile request was redirected; `url` is the target now being fetched.
    RedirectFollowed { coord: TileCoord, url: String },
    /// Every tile in the batch is loaded or failed.
    Finished,
}

/// Reply from a fetch task to the loader that spawned it.
#[derive(Debug)]
pub(crate) enum FetchMessage {
    /// The task is following a redirect to `url`.
    Redirected { coord: TileCoord, url: String },
    /// The task is done; `url` is the last URL actually fetched.
    Completed {
        coord: TileCoord,
        url: String,
        result: Result<Vec<u8>, FetchError>,
    },
}
