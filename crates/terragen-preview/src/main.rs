//! Preview binary: generates a square of chunks and writes one PNG per channel.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p terragen-preview -- --radius 2 --out preview`.

mod mosaic;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use terragen_chunk::{ChunkCache, ChunkCoord, ChunkCoordinator, GenerationSession, default_worker_count};
use terragen_config::{CliArgs, Config, ValidationError};
use tracing::info;

use crate::mosaic::{HEIGHT_RAMP, HUMIDITY_RAMP, Mosaic, RIDGE_RAMP, TEMPERATURE_RAMP, gradient};

#[derive(Parser, Debug)]
#[command(name = "terragen-preview", about = "Write PNG previews of generated terrain")]
struct PreviewArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Output directory for the PNG files.
    #[arg(long, default_value = "preview")]
    out: PathBuf,

    /// Chunks generated in each direction from the origin chunk.
    #[arg(long, default_value_t = 1)]
    radius: i32,

    /// Mesh LOD for every chunk. Defaults to the LOD table's choice by distance.
    #[arg(long)]
    lod: Option<u32>,

    /// Worker threads (defaults to one per core, minus one).
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
enum PreviewError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to create output directory: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("{failed} chunk builds failed; only {ready} of {wanted} chunks are complete")]
    Incomplete { ready: usize, wanted: usize, failed: usize },
}

fn main() -> ExitCode {
    let args = PreviewArgs::parse();

    let config_dir = match args.common.config.clone().or_else(Config::default_dir) {
        Some(dir) => dir,
        None => {
            eprintln!("{}", PreviewError::NoConfigDir);
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.common);

    let log_dir = config_dir.join("logs");
    terragen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &PreviewArgs, config: &Config) -> Result<(), PreviewError> {
    let started = Instant::now();
    let session = Arc::new(GenerationSession::initialize(config)?);
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "session ready");

    let workers = args.workers.unwrap_or_else(default_worker_count);
    let mut cache = ChunkCache::new(ChunkCoordinator::new(Arc::clone(&session), workers));

    let radius = args.radius.max(0);
    let chunk_size = session.world().chunk_size;
    let stride = (chunk_size - 1) as f64 * session.world().chunk_scale;
    let mut wanted = Vec::new();
    for y in -radius..=radius {
        for x in -radius..=radius {
            let coord = ChunkCoord::new(x, y);
            let distance = x.abs().max(y.abs()) as f64 * stride;
            let lod = args.lod.unwrap_or_else(|| cache.lod_for_distance(distance));
            wanted.push((coord, lod));
        }
    }

    let mut meshes = Vec::with_capacity(wanted.len());
    loop {
        cache.poll();
        meshes.clear();
        for &(coord, lod) in &wanted {
            if let Some(mesh) = cache.request_chunk(coord, lod) {
                meshes.push(mesh);
            }
        }
        if meshes.len() == wanted.len() {
            break;
        }
        // Nothing left in flight means the missing chunks will never arrive.
        if cache.in_flight() == 0 {
            return Err(PreviewError::Incomplete {
                ready: meshes.len(),
                wanted: wanted.len(),
                failed: cache.failed(),
            });
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let vertices: usize = meshes.iter().map(|m| m.vertex_count()).sum();
    let triangles: usize = meshes.iter().map(|m| m.triangle_count()).sum();
    info!(
        chunks = wanted.len(),
        vertices,
        triangles,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "chunks generated"
    );

    write_previews(&cache, radius, chunk_size, &args.out)?;
    info!(dir = %args.out.display(), "previews written");
    Ok(())
}

fn write_previews(
    cache: &ChunkCache,
    radius: i32,
    chunk_size: usize,
    out: &std::path::Path,
) -> Result<(), PreviewError> {
    std::fs::create_dir_all(out)?;

    let mut height = Mosaic::new(radius, chunk_size);
    let mut temperature = Mosaic::new(radius, chunk_size);
    let mut humidity = Mosaic::new(radius, chunk_size);
    let mut ridges = Mosaic::new(radius, chunk_size);
    let mut biomes = Mosaic::new(radius, chunk_size);
    let mut has_ridges = false;

    for chunk in cache.chunks() {
        let Some(map) = chunk.map_data() else {
            continue;
        };
        let coord = chunk.coord();
        let (width, _) = map.size();
        height.place(coord, width, &gradient(map.height(), HEIGHT_RAMP));
        temperature.place(coord, width, &gradient(map.temperature(), TEMPERATURE_RAMP));
        humidity.place(coord, width, &gradient(map.humidity(), HUMIDITY_RAMP));
        if let Some(grid) = map.ridges() {
            ridges.place(coord, width, &gradient(grid, RIDGE_RAMP));
            has_ridges = true;
        }
        biomes.place(coord, width, map.colors());
    }

    let (width, rows) = height.dimensions();
    tracing::debug!(width, rows, "mosaic assembled");

    height.save(&out.join("height.png"))?;
    temperature.save(&out.join("temperature.png"))?;
    humidity.save(&out.join("humidity.png"))?;
    biomes.save(&out.join("biomes.png"))?;
    if has_ridges {
        ridges.save(&out.join("ridges.png"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_args() {
        let args = PreviewArgs::parse_from([
            "terragen-preview",
            "--seed",
            "7",
            "--radius",
            "2",
            "--lod",
            "4",
            "--out",
            "shots",
        ]);
        assert_eq!(args.common.seed, Some(7));
        assert_eq!(args.radius, 2);
        assert_eq!(args.lod, Some(4));
        assert_eq!(args.out, PathBuf::from("shots"));
        assert!(args.workers.is_none());
    }

    #[test]
    fn test_incomplete_message() {
        let e = PreviewError::Incomplete { ready: 7, wanted: 9, failed: 2 };
        assert_eq!(e.to_string(), "2 chunk builds failed; only 7 of 9 chunks are complete");
    }

    #[test]
    fn test_run_writes_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.chunk_size = 17;
        config.world.estimation_size = 32;
        let args = PreviewArgs::parse_from([
            "terragen-preview",
            "--radius",
            "0",
            "--workers",
            "1",
            "--out",
            dir.path().to_str().unwrap(),
        ]);
        run(&args, &config).unwrap();
        for name in ["height", "temperature", "humidity", "ridges", "biomes"] {
            assert!(dir.path().join(format!("{name}.png")).exists(), "{name}.png missing");
        }
    }
}
