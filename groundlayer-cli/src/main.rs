//! groundlayer CLI - Command-line batch tile fetcher
//!
//! Fetches a window of map tiles around a position, reports progress while
//! the batch loads, and can stitch the finished batch into a single image.

use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use image::{imageops, GenericImageView, RgbaImage};

use groundlayer::coord::TileCoord;
use groundlayer::fetch::{FetcherConfig, ReqwestFetcher};
use groundlayer::loader::{LoaderConfig, LoaderEvent, Tile, TileLoader};
use groundlayer::logging;

const OSM_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Parser)]
#[command(name = "groundlayer")]
#[command(about = "Fetch and cache slippy-map tiles around a position", long_about = None)]
struct Args {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Zoom level
    #[arg(long, default_value_t = 16)]
    zoom: u32,

    /// Window radius in tiles around the center tile
    #[arg(long, default_value_t = 3)]
    blocks: u32,

    /// Tile URL template with {x}, {y} and {z} tokens
    #[arg(long, default_value = OSM_TEMPLATE)]
    template: String,

    /// Cache directory (defaults to the platform cache directory)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// HTTP proxy as host:port
    #[arg(long)]
    proxy: Option<String>,

    /// Serve cached tiles only; skip the network entirely
    #[arg(long)]
    offline: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Stitch the finished batch into one image at this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress per-tile progress lines
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _guard =
        match logging::init_logging(logging::default_log_dir(), logging::default_log_file()) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: file logging unavailable: {}", e);
                None
            }
        };

    let mut fetcher_config =
        FetcherConfig::default().with_timeout(Duration::from_secs(args.timeout));
    if let Some(proxy) = &args.proxy {
        fetcher_config = fetcher_config.with_proxy(proxy.clone());
    }
    let fetcher = match ReqwestFetcher::new(&fetcher_config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            process::exit(1);
        }
    };

    let cache_dir = args.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let config = LoaderConfig::new(args.template.clone(), args.lat, args.lon, args.zoom)
        .with_blocks(args.blocks)
        .with_cache_dir(cache_dir)
        .offline(args.offline);

    let mut loader = match TileLoader::new(config, fetcher) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("groundlayer v{}", groundlayer::VERSION);
    println!("Loading tiles around:");
    println!("  Location: {}, {}", args.lat, args.lon);
    println!(
        "  Zoom: {} ({:.2} m/px here)",
        args.zoom,
        loader.resolution()
    );
    println!(
        "  Center tile: {}/{} (offset {:.3}, {:.3})",
        loader.center().x,
        loader.center().y,
        loader.center().offset_x,
        loader.center().offset_y
    );
    println!("  Cache: {}", loader.cache_root().display());
    println!();

    let start = Instant::now();
    loader.start();

    let mut fetched = 0usize;
    let mut failed = 0usize;
    let mut interrupted = false;
    loop {
        let event = tokio::select! {
            event = loader.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                interrupted = true;
                None
            }
        };
        match event {
            Some(event) => report(&event, &mut fetched, &mut failed, args.quiet),
            None => break,
        }
    }

    let elapsed = start.elapsed();
    if interrupted {
        loader.abort();
        eprintln!("Interrupted, batch aborted after {:.2}s", elapsed.as_secs_f64());
        process::exit(1);
    }

    let tiles = loader.tiles();
    let loaded = tiles.iter().filter(|tile| tile.is_loaded()).count();
    println!();
    println!(
        "Batch finished in {:.2}s: {} loaded ({} fetched, {} cached), {} failed",
        elapsed.as_secs_f64(),
        loaded,
        fetched,
        loaded.saturating_sub(fetched),
        failed
    );

    if let Some(output) = &args.output {
        if let Err(message) = write_mosaic(loader.tiles(), output) {
            eprintln!("Error writing mosaic: {}", message);
            process::exit(1);
        }
    }
}

fn report(event: &LoaderEvent, fetched: &mut usize, failed: &mut usize, quiet: bool) {
    match event {
        LoaderEvent::RequestIssued { coord, url } => {
            if !quiet {
                println!("  requesting {} <- {}", coord, url);
            }
        }
        LoaderEvent::ImageReceived { coord, .. } => {
            *fetched += 1;
            if !quiet {
                println!("  loaded     {}", coord);
            }
        }
        LoaderEvent::TileFailed { coord, message } => {
            *failed += 1;
            eprintln!("  failed     {}: {}", coord, message);
        }
        LoaderEvent::RedirectFollowed { coord, url } => {
            if !quiet {
                println!("  redirect   {} -> {}", coord, url);
            }
        }
        LoaderEvent::Finished => {
            if !quiet {
                println!("  all tiles settled");
            }
        }
    }
}

/// Stitches every loaded tile onto one canvas, leaving gaps black where
/// tiles failed. Grid placement comes from the tile coordinates; tile pixel
/// size is taken from the first loaded tile.
fn write_mosaic(tiles: &[Tile], output: &Path) -> Result<(), String> {
    let loaded: Vec<(TileCoord, &image::DynamicImage)> = tiles
        .iter()
        .filter_map(|tile| tile.image().map(|image| (tile.coord(), image)))
        .collect();
    let Some(&(_, sample)) = loaded.first() else {
        println!("No loaded tiles, skipping mosaic");
        return Ok(());
    };
    let (tile_w, tile_h) = sample.dimensions();

    let min_x = loaded.iter().map(|(c, _)| c.x).min().unwrap_or(0);
    let max_x = loaded.iter().map(|(c, _)| c.x).max().unwrap_or(0);
    let min_y = loaded.iter().map(|(c, _)| c.y).min().unwrap_or(0);
    let max_y = loaded.iter().map(|(c, _)| c.y).max().unwrap_or(0);
    let cols = max_x - min_x + 1;
    let rows = max_y - min_y + 1;

    let mut canvas = RgbaImage::new(cols * tile_w, rows * tile_h);
    for (coord, tile_image) in &loaded {
        let x0 = ((coord.x - min_x) * tile_w) as i64;
        let y0 = ((coord.y - min_y) * tile_h) as i64;
        imageops::replace(&mut canvas, &tile_image.to_rgba8(), x0, y0);
    }

    canvas.save(output).map_err(|error| error.to_string())?;
    println!(
        "✓ Saved mosaic: {} ({}x{} tiles, {}x{} px)",
        output.display(),
        cols,
        rows,
        canvas.width(),
        canvas.height()
    );
    Ok(())
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("groundlayer"))
        .unwrap_or_else(|| std::env::temp_dir().join("groundlayer"))
}
