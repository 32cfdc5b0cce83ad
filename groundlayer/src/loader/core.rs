//! Batch tile loader.

use std::collections::VecDeque;
use std::path::Path;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, TileCache};
use crate::coord::{self, CenterTile, CoordError, TileCoord};
use crate::fetch::{FetchError, TileFetcher, MAX_REDIRECT_HOPS};
use crate::loader::batch::Batch;
use crate::loader::config::LoaderConfig;
use crate::loader::events::{FetchMessage, LoaderEvent};
use crate::loader::tile::Tile;
use crate::source::TileSource;

/// Failure to construct a tile loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid map position: {0}")]
    Coord(#[from] CoordError),

    #[error("cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

/// Loads a square window of tiles around a geographic position.
///
/// A loader is anchored on one position, zoom and source for its lifetime;
/// callers build a new loader to look somewhere else. [`start`] launches a
/// batch: cached tiles are adopted immediately and the rest are fetched
/// concurrently, each fetch owned by the tile it serves. Progress surfaces
/// through [`next_event`], which also drives all tile state changes, so
/// consumers never observe a half-updated batch.
///
/// Restarting or aborting drops the previous batch wholesale. Dropping a
/// pending tile aborts its fetch task, and each batch listens on its own
/// reply channel, so late replies from a discarded batch have nowhere to
/// land.
///
/// [`start`]: TileLoader::start
/// [`next_event`]: TileLoader::next_event
#[derive(Debug)]
pub struct TileLoader<F> {
    source: TileSource,
    cache: TileCache,
    fetcher: F,
    latitude: f64,
    zoom: u32,
    blocks: u32,
    offline: bool,
    center: CenterTile,
    batch: Option<Batch>,
    queued: VecDeque<LoaderEvent>,
}

impl<F> TileLoader<F>
where
    F: TileFetcher + Clone + 'static,
{
    /// Validates the position and prepares the cache namespace.
    ///
    /// # Errors
    ///
    /// Fails when the position cannot be projected at the requested zoom,
    /// or when the cache directory cannot be created. A projection failure
    /// leaves the filesystem untouched.
    pub fn new(config: LoaderConfig, fetcher: F) -> Result<Self, LoaderError> {
        let center = coord::center_tile(config.latitude, config.longitude, config.zoom)?;
        let source = TileSource::new(config.template);
        let cache = TileCache::new(&config.cache_dir, source.namespace_key())?;
        debug!(
            source = source.template(),
            zoom = config.zoom,
            center_x = center.x,
            center_y = center.y,
            "tile loader ready"
        );
        Ok(Self {
            source,
            cache,
            fetcher,
            latitude: config.latitude,
            zoom: config.zoom,
            blocks: config.blocks,
            offline: config.offline,
            center,
            batch: None,
            queued: VecDeque::new(),
        })
    }

    /// Launches a batch for the loader's window, superseding any batch
    /// already running.
    ///
    /// The window spans `blocks` tiles in every direction around the center
    /// tile, clamped to the grid; rows are enumerated north to south, tiles
    /// within a row west to east. Cached tiles join the batch already
    /// loaded. The rest get one fetch task each, unless the loader is
    /// offline, in which case they are left out of the batch entirely.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        self.abort();

        let (tx, rx) = mpsc::unbounded_channel();
        let max = coord::max_tile_index(self.zoom);
        let min_x = self.center.x.saturating_sub(self.blocks);
        let max_x = self.center.x.saturating_add(self.blocks).min(max);
        let min_y = self.center.y.saturating_sub(self.blocks);
        let max_y = self.center.y.saturating_add(self.blocks).min(max);

        let mut tiles = Vec::new();
        let mut cached = 0usize;
        let mut requested = 0usize;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let coord = TileCoord::new(x, y, self.zoom);
                if let Some(image) = self.cache.load(coord) {
                    cached += 1;
                    tiles.push(Tile::loaded(coord, image));
                } else if !self.offline {
                    let url = self.source.tile_url(coord);
                    let handle =
                        spawn_fetch(self.fetcher.clone(), coord, url.clone(), tx.clone());
                    self.queued
                        .push_back(LoaderEvent::RequestIssued { coord, url });
                    requested += 1;
                    tiles.push(Tile::pending(coord, handle));
                }
            }
        }
        drop(tx);

        info!(
            zoom = self.zoom,
            center_x = self.center.x,
            center_y = self.center.y,
            cached,
            requested,
            "tile batch started"
        );
        self.batch = Some(Batch::new(tiles, rx));
        self.check_completion();
    }

    /// Discards the current batch, aborting every request still in flight.
    /// Undelivered events of the discarded batch are dropped with it.
    pub fn abort(&mut self) {
        if let Some(batch) = self.batch.take() {
            debug!(tiles = batch.len(), "aborting tile batch");
        }
        self.queued.clear();
    }

    /// Next progress event of the current batch.
    ///
    /// Resolves to `None` once the batch has finished and every event has
    /// been delivered, or when no batch is running. All tile state changes
    /// happen inside this call, on the caller's task.
    ///
    /// Cancel-safe: dropping the returned future loses no events.
    pub async fn next_event(&mut self) -> Option<LoaderEvent> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(event);
            }
            let received = match self.batch.as_mut() {
                None => return None,
                Some(batch) => {
                    if batch.finished() {
                        return None;
                    }
                    batch.recv().await
                }
            };
            match received {
                Some(message) => self.handle_message(message),
                None => self.fail_stranded(),
            }
        }
    }

    fn handle_message(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Redirected { coord, url } => {
                let tracked = self
                    .batch
                    .as_ref()
                    .is_some_and(|batch| batch.is_pending(coord));
                if tracked {
                    warn!(tile = %coord, target = %url, "following tile redirect");
                    self.queued
                        .push_back(LoaderEvent::RedirectFollowed { coord, url });
                }
            }
            FetchMessage::Completed { coord, url, result } => {
                let event = {
                    let Some(batch) = self.batch.as_mut() else { return };
                    let Some(tile) = batch.tile_mut(coord) else { return };
                    if !tile.is_pending() {
                        return;
                    }
                    match result {
                        Ok(bytes) => match image::load_from_memory(&bytes) {
                            Ok(image) => {
                                self.cache.store(coord, &image);
                                tile.complete(image);
                                debug!(tile = %coord, "tile image received");
                                LoaderEvent::ImageReceived { coord, url }
                            }
                            Err(error) => {
                                tile.fail();
                                warn!(tile = %coord, %error, "tile payload did not decode");
                                LoaderEvent::TileFailed {
                                    coord,
                                    message: format!("unable to decode image at {url}: {error}"),
                                }
                            }
                        },
                        Err(error) => {
                            tile.fail();
                            warn!(tile = %coord, %error, "tile fetch failed");
                            LoaderEvent::TileFailed {
                                coord,
                                message: format!("failed loading {url}: {error}"),
                            }
                        }
                    }
                };
                self.queued.push_back(event);
                self.check_completion();
            }
        }
    }

    /// The reply channel closed while tiles were still pending. Should not
    /// happen while tiles own live tasks; fail the stragglers so the batch
    /// still settles.
    fn fail_stranded(&mut self) {
        let stranded = match self.batch.as_mut() {
            Some(batch) => batch.fail_pending(),
            None => return,
        };
        for coord in stranded {
            warn!(tile = %coord, "fetch task ended without a reply");
            self.queued.push_back(LoaderEvent::TileFailed {
                coord,
                message: "fetch task ended without a reply".to_string(),
            });
        }
        self.check_completion();
    }

    fn check_completion(&mut self) {
        let finished_now = match self.batch.as_mut() {
            Some(batch) if !batch.finished() && batch.is_complete() => {
                batch.mark_finished();
                true
            }
            _ => false,
        };
        if finished_now {
            info!(zoom = self.zoom, "tile batch finished");
            self.queued.push_back(LoaderEvent::Finished);
        }
    }

    /// Tiles of the current batch in enumeration order, or empty when no
    /// batch is running.
    pub fn tiles(&self) -> &[Tile] {
        self.batch.as_ref().map_or(&[], Batch::tiles)
    }

    /// Whether every tile of the current batch has settled.
    pub fn is_complete(&self) -> bool {
        self.batch.as_ref().is_some_and(Batch::is_complete)
    }

    pub fn has_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// The tile under the loader's position, with sub-tile offsets.
    pub fn center(&self) -> &CenterTile {
        &self.center
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Ground resolution at the loader's position, in metres per pixel.
    pub fn resolution(&self) -> f64 {
        coord::resolution(self.latitude, self.zoom)
    }

    /// Whether a position still falls inside the loaded center tile.
    pub fn inside_center_tile(&self, lat: f64, lon: f64) -> Result<bool, CoordError> {
        coord::inside_center_tile(lat, lon, self.zoom, &self.center)
    }

    /// Directory holding this loader's cached tiles.
    pub fn cache_root(&self) -> &Path {
        self.cache.root()
    }
}

/// Spawns the fetch task for one tile. The returned handle aborts the task
/// when dropped.
fn spawn_fetch<F>(
    fetcher: F,
    coord: TileCoord,
    url: String,
    tx: mpsc::UnboundedSender<FetchMessage>,
) -> AbortOnDropHandle<()>
where
    F: TileFetcher + 'static,
{
    let handle = tokio::spawn(async move {
        let (final_url, result) = chase_redirects(&fetcher, coord, url, &tx).await;
        let _ = tx.send(FetchMessage::Completed {
            coord,
            url: final_url,
            result,
        });
    });
    AbortOnDropHandle::new(handle)
}

/// Fetches `url`, following redirects up to [`MAX_REDIRECT_HOPS`].
///
/// A redirect whose target equals the target just followed is treated as
/// the final response rather than chased again. Returns the last URL
/// fetched along with the payload or error.
async fn chase_redirects<F: TileFetcher>(
    fetcher: &F,
    coord: TileCoord,
    url: String,
    tx: &mpsc::UnboundedSender<FetchMessage>,
) -> (String, Result<Vec<u8>, FetchError>) {
    let mut current = url;
    let mut last_followed: Option<String> = None;
    let mut hops = 0usize;
    loop {
        let mut response = match fetcher.fetch(&current).await {
            Ok(response) => response,
            Err(error) => return (current, Err(error)),
        };

        if let Some(target) = response.redirect.take() {
            if last_followed.as_deref() != Some(target.as_str()) {
                hops += 1;
                if hops > MAX_REDIRECT_HOPS {
                    return (current, Err(FetchError::TooManyRedirects { url: target }));
                }
                let _ = tx.send(FetchMessage::Redirected {
                    coord,
                    url: target.clone(),
                });
                last_followed = Some(target.clone());
                current = target;
                continue;
            }
        }

        if response.is_success() {
            return (current, Ok(response.body));
        }
        return (
            current.clone(),
            Err(FetchError::Status {
                status: response.status,
                url: current,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use tempfile::TempDir;

    #[derive(Clone)]
    struct NullFetcher;

    impl TileFetcher for NullFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            Err(FetchError::Transport {
                url: url.to_string(),
                message: "no network in this test".to_string(),
            })
        }
    }

    fn config_in(dir: &Path) -> LoaderConfig {
        LoaderConfig::new("https://tile.test/{z}/{x}/{y}.png", 0.0, 0.0, 1).with_cache_dir(dir)
    }

    #[test]
    fn rejects_an_unprojectable_position_without_touching_disk() {
        let base = TempDir::new().expect("tempdir");
        let cache_dir = base.path().join("cache");
        let config = LoaderConfig::new("https://tile.test/{z}/{x}/{y}.png", 86.0, 0.0, 4)
            .with_cache_dir(&cache_dir);

        let result = TileLoader::new(config, NullFetcher);
        assert!(matches!(
            result,
            Err(LoaderError::Coord(CoordError::LatitudeOutOfRange(_)))
        ));
        assert!(!cache_dir.exists());
    }

    #[test]
    fn fails_when_the_cache_cannot_be_created() {
        let base = TempDir::new().expect("tempdir");
        let blocker = base.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").expect("write blocker");

        let config = config_in(&blocker);
        assert!(matches!(
            TileLoader::new(config, NullFetcher),
            Err(LoaderError::Cache(_))
        ));
    }

    #[test]
    fn prepares_the_source_namespace_on_construction() {
        let base = TempDir::new().expect("tempdir");
        let loader = TileLoader::new(config_in(base.path()), NullFetcher).expect("loader");
        assert!(loader.cache_root().is_dir());
        assert!(loader.cache_root().starts_with(base.path()));
    }

    #[test]
    fn idle_loader_has_no_tiles() {
        let base = TempDir::new().expect("tempdir");
        let loader = TileLoader::new(config_in(base.path()), NullFetcher).expect("loader");
        assert!(loader.tiles().is_empty());
        assert!(!loader.has_batch());
        assert!(!loader.is_complete());
    }

    #[test]
    fn exposes_the_resolved_center_and_resolution() {
        let base = TempDir::new().expect("tempdir");
        let loader = TileLoader::new(config_in(base.path()), NullFetcher).expect("loader");

        assert_eq!(loader.center().x, 1);
        assert_eq!(loader.center().y, 1);
        assert!((loader.resolution() - 78_271.517).abs() < 1e-3);

        // Longitude -100 projects a full tile west of the center at zoom 1.
        assert_eq!(loader.inside_center_tile(0.0, 0.0), Ok(true));
        assert_eq!(loader.inside_center_tile(0.0, -100.0), Ok(false));
        assert!(loader.inside_center_tile(86.0, 0.0).is_err());
    }
}
