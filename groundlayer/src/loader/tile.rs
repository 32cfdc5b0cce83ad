//! Per-tile lifecycle state.

use image::DynamicImage;
use tokio_util::task::AbortOnDropHandle;

use crate::coord::TileCoord;

/// Where a tile is in its lifecycle.
///
/// A pending tile owns the handle of its fetch task. Dropping the tile (or
/// the batch holding it) aborts the task, so no reply can outlive the tile
/// it was meant for.
#[derive(Debug)]
pub enum TileState {
    /// Fetch in flight.
    Pending(AbortOnDropHandle<()>),
    /// Image decoded and ready to use.
    Loaded(DynamicImage),
    /// Fetch or decode failed; the batch settles without this tile.
    Failed,
}

/// One tile tracked by a batch.
#[derive(Debug)]
pub struct Tile {
    coord: TileCoord,
    state: TileState,
}

impl Tile {
    pub(crate) fn pending(coord: TileCoord, handle: AbortOnDropHandle<()>) -> Self {
        Self {
            coord,
            state: TileState::Pending(handle),
        }
    }

    pub(crate) fn loaded(coord: TileCoord, image: DynamicImage) -> Self {
        Self {
            coord,
            state: TileState::Loaded(image),
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn state(&self) -> &TileState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TileState::Pending(_))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TileState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, TileState::Failed)
    }

    /// The decoded image, when this tile is loaded.
    pub fn image(&self) -> Option<&DynamicImage> {
        match &self.state {
            TileState::Loaded(image) => Some(image),
            _ => None,
        }
    }

    pub(crate) fn complete(&mut self, image: DynamicImage) {
        self.state = TileState::Loaded(image);
    }

    pub(crate) fn fail(&mut self) {
        self.state = TileState::Failed;
    }
}
