//! One batch of tiles in flight.

use tokio::sync::mpsc;

use crate::coord::TileCoord;
use crate::loader::events::FetchMessage;
use crate::loader::tile::Tile;

/// The tiles and reply channel belonging to a single batch.
///
/// The channel pair is created fresh per batch, so replies from a
/// superseded batch land on a closed channel and vanish instead of touching
/// state they no longer own. Tiles keep the enumeration order they were
/// inserted in.
#[derive(Debug)]
pub(crate) struct Batch {
    tiles: Vec<Tile>,
    rx: mpsc::UnboundedReceiver<FetchMessage>,
    finished: bool,
}

impl Batch {
    pub(crate) fn new(tiles: Vec<Tile>, rx: mpsc::UnboundedReceiver<FetchMessage>) -> Self {
        Self {
            tiles,
            rx,
            finished: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| tile.coord() == coord)
    }

    pub(crate) fn is_pending(&self, coord: TileCoord) -> bool {
        self.tiles
            .iter()
            .any(|tile| tile.coord() == coord && tile.is_pending())
    }

    /// A batch is complete once no tile is waiting on a request.
    pub(crate) fn is_complete(&self) -> bool {
        !self.tiles.iter().any(Tile::is_pending)
    }

    pub(crate) fn finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Fails every tile still pending and returns their coordinates.
    pub(crate) fn fail_pending(&mut self) -> Vec<TileCoord> {
        let mut failed = Vec::new();
        for tile in &mut self.tiles {
            if tile.is_pending() {
                tile.fail();
                failed.push(tile.coord());
            }
        }
        failed
    }

    pub(crate) async fn recv(&mut self) -> Option<FetchMessage> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use tokio_util::task::AbortOnDropHandle;

    fn loaded_tile(x: u32, y: u32) -> Tile {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])));
        Tile::loaded(TileCoord::new(x, y, 4), image)
    }

    #[test]
    fn batch_without_pending_tiles_is_complete() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let batch = Batch::new(vec![loaded_tile(0, 0), loaded_tile(1, 0)], rx);
        assert!(batch.is_complete());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn empty_batch_is_complete() {
        let (_tx, rx) = mpsc::unbounded_channel();
        assert!(Batch::new(Vec::new(), rx).is_complete());
    }

    #[tokio::test]
    async fn pending_tiles_hold_completion_open() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let handle = AbortOnDropHandle::new(tokio::spawn(async {}));
        let pending = Tile::pending(TileCoord::new(2, 2, 4), handle);
        let mut batch = Batch::new(vec![loaded_tile(0, 0), pending], rx);

        assert!(!batch.is_complete());
        assert!(batch.is_pending(TileCoord::new(2, 2, 4)));

        let failed = batch.fail_pending();
        assert_eq!(failed, vec![TileCoord::new(2, 2, 4)]);
        assert!(batch.is_complete());
    }
}
