//! Generation configuration with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use terragen_biome::{Band, BeachMode, Biome, Color};
use terragen_lod::LodTable;
use terragen_noise::{NoiseKind, NoiseSettings, NormalizeMode, ResponseCurve};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk geometry and height composition.
    pub world: WorldConfig,
    /// Noise settings per channel.
    pub noise: NoiseConfig,
    /// Response curves per channel.
    pub curves: CurveConfig,
    /// Biome definitions, in authoring order.
    pub biomes: Vec<Biome>,
    /// Water and beach biome names.
    pub water: WaterConfig,
    /// LOD levels, nearest first.
    pub lods: LodTable,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Chunk geometry and height composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid cells per chunk edge. `chunk_size - 1` must be divisible by every LOD step.
    pub chunk_size: usize,
    /// Multiplier applied to chunk origins.
    pub chunk_scale: f64,
    /// Normalization used for every channel.
    pub normalize_mode: NormalizeMode,
    /// Vertical scale applied by the mesh builder.
    pub height_multiplier: f32,
    /// Weight of the ridge channel added to the raw height, in `[0, 1]`.
    pub ridge_intensity: f32,
    /// Biome regions smaller than this many tiles are pruned.
    pub min_region_size: usize,
    /// Clamp each cell's height into its biome's height band after classification.
    pub clamp_height_to_biome: bool,
    /// Edge length of the area sampled to estimate global noise ranges.
    pub estimation_size: usize,
}

/// Noise settings per channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Height channel.
    pub height: NoiseSettings,
    /// Temperature channel.
    pub temperature: NoiseSettings,
    /// Humidity channel.
    pub humidity: NoiseSettings,
    /// Ridge detail channel. `None` reuses the height settings with [`NoiseKind::Ridge`].
    pub ridges: Option<NoiseSettings>,
}

/// Response curves per channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurveConfig {
    /// Applied by the mesh builder to vertex heights.
    pub height: ResponseCurve,
    /// Applied to the temperature channel.
    pub temperature: ResponseCurve,
    /// Applied to the humidity channel.
    pub humidity: ResponseCurve,
    /// Applied to the ridge channel. `None` reuses the height curve.
    pub ridges: Option<ResponseCurve>,
}

/// Names of the biomes with a fixed role.
///
/// Deep ocean and shallows enable height flooding during classification;
/// beach additionally enables beach carving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Biome assigned below its max height.
    pub deep_ocean: Option<String>,
    /// Biome assigned between the deep-ocean and its own max height.
    pub shallows: Option<String>,
    /// Biome carved along shallows.
    pub beach: Option<String>,
    /// Which shallows tiles seed beach carving.
    pub beach_mode: BeachMode,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl NoiseConfig {
    /// Ridge settings, derived from the height settings when not given.
    pub fn ridge_settings(&self) -> NoiseSettings {
        self.ridges.clone().unwrap_or_else(|| NoiseSettings {
            kind: NoiseKind::Ridge,
            ..self.height.clone()
        })
    }
}

impl CurveConfig {
    /// Ridge curve, falling back to the height curve.
    pub fn ridge_curve(&self) -> &ResponseCurve {
        self.ridges.as_ref().unwrap_or(&self.height)
    }
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            noise: NoiseConfig::default(),
            curves: CurveConfig::default(),
            biomes: default_biomes(),
            water: WaterConfig::default(),
            lods: LodTable::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 241,
            chunk_scale: 1.0,
            normalize_mode: NormalizeMode::Global,
            height_multiplier: 30.0,
            ridge_intensity: 0.1,
            min_region_size: 6,
            clamp_height_to_biome: false,
            estimation_size: 256,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        let warped = |seed, scale| NoiseSettings {
            kind: NoiseKind::DomainWarp,
            seed,
            scale,
            ..Default::default()
        };
        Self {
            height: warped(1337, 90.0),
            temperature: NoiseSettings {
                octaves: 3,
                ..warped(4242, 220.0)
            },
            humidity: NoiseSettings {
                octaves: 3,
                ..warped(7331, 160.0)
            },
            ridges: None,
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            deep_ocean: Some("Deep Ocean".to_string()),
            shallows: Some("Shallows".to_string()),
            beach: Some("Beach".to_string()),
            beach_mode: BeachMode::AllShallows,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// The built-in biome table.
pub fn default_biomes() -> Vec<Biome> {
    fn biome(name: &str, height: (f32, f32), temp: (f32, f32), humidity: (f32, f32), color: Color) -> Biome {
        Biome {
            name: name.to_string(),
            height: Band::new(height.0, height.1),
            temperature: Band::new(temp.0, temp.1),
            humidity: Band::new(humidity.0, humidity.1),
            weight_bias: 0.0,
            color,
        }
    }

    vec![
        biome("Deep Ocean", (0.0, 0.3), (0.0, 1.0), (0.0, 1.0), Color::rgb(24, 52, 120)),
        biome("Shallows", (0.3, 0.4), (0.0, 1.0), (0.0, 1.0), Color::rgb(54, 110, 190)),
        biome("Beach", (0.4, 0.43), (0.0, 1.0), (0.0, 1.0), Color::rgb(222, 208, 150)),
        biome("Desert", (0.43, 0.65), (0.6, 1.0), (0.0, 0.3), Color::rgb(210, 180, 100)),
        biome("Grassland", (0.43, 0.65), (0.3, 0.8), (0.2, 0.6), Color::rgb(110, 170, 70)),
        biome("Forest", (0.45, 0.75), (0.25, 0.7), (0.5, 1.0), Color::rgb(40, 110, 45)),
        biome("Tundra", (0.43, 0.75), (0.0, 0.3), (0.0, 1.0), Color::rgb(150, 160, 140)),
        biome("Mountain", (0.75, 0.9), (0.0, 1.0), (0.0, 1.0), Color::rgb(110, 100, 90)),
        biome("Snow", (0.9, 1.0), (0.0, 1.0), (0.0, 1.0), Color::rgb(240, 240, 245)),
    ]
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for terragen (e.g. `~/.config/terragen`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("terragen"))
    }

    /// Load config from the given directory, or create a default config file.
    ///
    /// A loaded config is validated before it is returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("chunk_size: 241"));
        assert!(ron_str.contains("normalize_mode: Global"));
        assert!(ron_str.contains("\"Deep Ocean\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let ron_str = "(world: (chunk_size: 121), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.chunk_size, 121);
        assert_eq!(config.world.min_region_size, 6);
        assert_eq!(config.noise, NoiseConfig::default());
        assert_eq!(config.biomes, default_biomes());
        assert_eq!(config.lods, LodTable::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_unsorted_curve_fails_to_parse() {
        let ron_str = "(curves: (height: [(time: 0.5, value: 0.0), (time: 0.2, value: 1.0)]))";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_ridge_fallbacks() {
        let config = Config::default();
        let ridge = config.noise.ridge_settings();
        assert_eq!(ridge.kind, NoiseKind::Ridge);
        assert_eq!(ridge.seed, config.noise.height.seed);
        assert_eq!(config.curves.ridge_curve(), &config.curves.height);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.chunk_size = 121;
        config.noise.height.seed = -9;
        config.water.beach_mode = BeachMode::Shoreline;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(world: (chunk_size: 240))").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.world.height_multiplier = 55.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().world.height_multiplier, 55.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
