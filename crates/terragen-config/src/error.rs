//! Configuration error types.

use terragen_biome::BiomeSetError;
use terragen_lod::LodError;
use terragen_noise::NoiseSettingsError;

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The config parsed but describes an unusable session.
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Structural problems found by [`crate::Config::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Chunks need at least two cells per edge.
    #[error("chunk size {0} must be at least 2")]
    ChunkSize(usize),

    /// Chunk scale is not a positive finite number.
    #[error("chunk scale {0} must be positive and finite")]
    ChunkScale(f64),

    /// Height multiplier is NaN or infinite.
    #[error("height multiplier {0} is not finite")]
    HeightMultiplier(f32),

    /// Ridge intensity is outside `[0, 1]`.
    #[error("ridge intensity {0} is outside [0, 1]")]
    RidgeIntensity(f32),

    /// Range estimation needs a non-empty area.
    #[error("estimation size must be at least 1")]
    EstimationSize,

    /// A noise channel's settings are invalid.
    #[error("{channel} noise: {source}")]
    Noise {
        /// Channel name.
        channel: &'static str,
        /// What is wrong with it.
        #[source]
        source: NoiseSettingsError,
    },

    /// The biome list is invalid.
    #[error(transparent)]
    Biomes(#[from] BiomeSetError),

    /// A water role names a biome that is not in the list.
    #[error("{role} biome `{name}` is not defined")]
    UnknownWaterBiome {
        /// `deep_ocean`, `shallows` or `beach`.
        role: &'static str,
        /// Configured name.
        name: String,
    },

    /// Deep ocean and shallows must be configured together, and beach needs both.
    #[error("water biomes are incomplete: deep_ocean and shallows are required together, beach needs both")]
    IncompleteWater,

    /// The LOD table does not fit the chunk size.
    #[error(transparent)]
    Lod(#[from] LodError),
}
