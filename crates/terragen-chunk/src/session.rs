//! Read-only generation state shared by every worker.
//!
//! A [`GenerationSession`] is built once from a validated [`Config`]. It owns
//! the noise fields (with derived padding and, in global mode, estimated
//! ranges), the sorted biome set and the resolved water roles, and turns a
//! chunk origin into a complete [`MapData`].

use terragen_biome::{BiomeSet, carve_beach, classify_grid, color_map, prune, reapply_height_by_biome};
use terragen_config::{Config, CurveConfig, ResolvedWater, ValidationError, WorldConfig};
use terragen_lod::LodTable;
use terragen_mesh::{MeshData, build_terrain_mesh};
use terragen_noise::{
    NoiseField, NoiseSettings, NormalizeMode, ResponseCurve, ScalarGrid, estimate_noise_range,
    sanitize, smoothstep,
};

use crate::map_data::MapData;

/// Integer chunk coordinate on the world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Column, growing east.
    pub x: i32,
    /// Row, growing north.
    pub y: i32,
}

impl ChunkCoord {
    /// Coordinate of the chunk at column `x`, row `y`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Everything needed to generate chunks, fixed for the session's lifetime.
#[derive(Debug)]
pub struct GenerationSession {
    world: WorldConfig,
    height: NoiseField,
    temperature: NoiseField,
    humidity: NoiseField,
    ridges: Option<NoiseField>,
    curves: CurveConfig,
    biomes: BiomeSet,
    water: Option<ResolvedWater>,
    lods: LodTable,
}

impl GenerationSession {
    /// Validate `config` and prepare the noise fields.
    ///
    /// In [`NormalizeMode::Global`] this samples every channel over an
    /// `estimation_size` square to cache its raw range, which is the most
    /// expensive part of initialization.
    pub fn initialize(config: &Config) -> Result<Self, ValidationError> {
        config.validate()?;

        let world = config.world.clone();
        let prepare = |settings: &NoiseSettings| {
            let mut settings = settings.clone().with_derived_padding();
            if world.normalize_mode == NormalizeMode::Global {
                settings.range = Some(estimate_noise_range(&settings, world.estimation_size));
            }
            NoiseField::new(settings)
        };

        let height = prepare(&config.noise.height);
        let temperature = prepare(&config.noise.temperature);
        let humidity = prepare(&config.noise.humidity);
        let ridges = (world.ridge_intensity > 0.0).then(|| prepare(&config.noise.ridge_settings()));

        let biomes = config.biome_set()?;
        let water = config.water.resolve(&biomes)?;

        tracing::info!(
            chunk_size = world.chunk_size,
            normalize_mode = ?world.normalize_mode,
            biomes = biomes.len(),
            water = water.is_some(),
            ridges = ridges.is_some(),
            "generation session initialized"
        );

        Ok(Self {
            world,
            height,
            temperature,
            humidity,
            ridges,
            curves: config.curves.clone(),
            biomes,
            water,
            lods: config.lods.clone(),
        })
    }

    /// World layout this session was initialized with.
    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// Biome table used for classification and coloring.
    pub fn biomes(&self) -> &BiomeSet {
        &self.biomes
    }

    /// LOD table shared with the chunk cache.
    pub fn lods(&self) -> &LodTable {
        &self.lods
    }

    /// Settings of the height channel, including derived padding and cached range.
    pub fn height_settings(&self) -> &NoiseSettings {
        self.height.settings()
    }

    /// Grid-space origin of `coord`: `coord * (chunk_size - 1) * chunk_scale`.
    ///
    /// Neighbouring chunks share their edge row and column.
    pub fn chunk_origin(&self, coord: ChunkCoord) -> [f64; 2] {
        let stride = (self.world.chunk_size - 1) as f64 * self.world.chunk_scale;
        [coord.x as f64 * stride, coord.y as f64 * stride]
    }

    /// Generate, classify and post-process one chunk at `origin`.
    pub fn generate_map_data(&self, origin: [f64; 2]) -> MapData {
        let size = self.world.chunk_size;
        let mode = self.world.normalize_mode;

        let raw_height = self.height.generate(origin, mode, size, size);
        let raw_temperature = self.temperature.generate(origin, mode, size, size);
        let raw_humidity = self.humidity.generate(origin, mode, size, size);
        let raw_ridges = self
            .ridges
            .as_ref()
            .map(|field| field.generate(origin, mode, size, size));

        let intensity = self.world.ridge_intensity as f64;
        let mut composed: Vec<f64> = raw_height
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let ridge = raw_ridges.as_ref().map_or(0.0, |r| r.as_slice()[i] as f64);
                smoothstep(h as f64 + ridge * intensity)
            })
            .collect();
        let replaced = sanitize(&mut composed, size, size);
        if replaced > 0 {
            tracing::warn!(?origin, replaced, "non-finite height samples replaced");
        }
        let height = ScalarGrid::from_fn(size, size, |x, y| composed[y * size + x]);

        let temperature = apply_curve(&raw_temperature, &self.curves.temperature, 1.0);
        let humidity = apply_curve(&raw_humidity, &self.curves.humidity, 1.0);
        let ridges = raw_ridges
            .as_ref()
            .map(|r| apply_curve(r, self.curves.ridge_curve(), self.world.ridge_intensity));

        if let Some((min, max)) = height.min_max() {
            let mean = height.as_slice().iter().map(|&v| v as f64).sum::<f64>() / height.len() as f64;
            tracing::debug!(?origin, min, max, mean, "height channel composed");
        }

        let mut biomes = classify_grid(
            &height,
            &temperature,
            &humidity,
            &self.biomes,
            self.water.map(|w| w.levels),
        );
        if let Some(water) = self.water
            && let Some(beach) = water.beach
        {
            biomes = carve_beach(
                &biomes,
                water.levels.shallows,
                beach,
                water.levels.deep_ocean,
                water.beach_mode,
            );
        }
        let biomes = prune(&biomes, self.world.min_region_size);

        let height = if self.world.clamp_height_to_biome {
            reapply_height_by_biome(&height, &biomes, &self.biomes)
        } else {
            height
        };
        let colors = color_map(&biomes, &self.biomes);

        tracing::debug!(
            ?origin,
            size,
            unclassified = biomes.unclassified_count(),
            "map data generated"
        );
        MapData::new(origin, height, temperature, humidity, ridges, biomes, colors)
    }

    /// Build the terrain mesh of `map` at `lod`.
    pub fn build_mesh(&self, map: &MapData, lod: u32) -> MeshData {
        let mesh = build_terrain_mesh(
            map.height(),
            self.world.height_multiplier,
            &self.curves.height,
            lod,
        );
        tracing::debug!(
            origin = ?map.origin(),
            lod,
            vertices = mesh.vertex_count(),
            "mesh data generated"
        );
        mesh
    }
}

/// `clamp01(curve(clamp01(v)) * gain)` per cell.
fn apply_curve(grid: &ScalarGrid, curve: &ResponseCurve, gain: f32) -> ScalarGrid {
    ScalarGrid::from_fn(grid.width(), grid.height(), |x, y| {
        (curve.evaluate(grid.get(x, y).clamp(0.0, 1.0)) * gain) as f64
    })
}
