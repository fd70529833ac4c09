//! Structural validation, run before any generation starts.

use terragen_biome::{BeachMode, BiomeId, BiomeSet, WaterLevels};

use crate::config::{Config, WaterConfig};
use crate::error::ValidationError;

/// Water roles resolved to biome IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedWater {
    /// Flooding thresholds for classification.
    pub levels: WaterLevels,
    /// Beach biome, when beach carving is enabled.
    pub beach: Option<BiomeId>,
    /// Which shallows tiles seed beach carving.
    pub beach_mode: BeachMode,
}

impl Config {
    /// Check every structural invariant of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let world = &self.world;
        if world.chunk_size < 2 {
            return Err(ValidationError::ChunkSize(world.chunk_size));
        }
        if !world.chunk_scale.is_finite() || world.chunk_scale <= 0.0 {
            return Err(ValidationError::ChunkScale(world.chunk_scale));
        }
        if !world.height_multiplier.is_finite() {
            return Err(ValidationError::HeightMultiplier(world.height_multiplier));
        }
        if !(0.0..=1.0).contains(&world.ridge_intensity) {
            return Err(ValidationError::RidgeIntensity(world.ridge_intensity));
        }
        if world.estimation_size == 0 {
            return Err(ValidationError::EstimationSize);
        }

        let channels = [
            ("height", self.noise.height.clone()),
            ("temperature", self.noise.temperature.clone()),
            ("humidity", self.noise.humidity.clone()),
            ("ridges", self.noise.ridge_settings()),
        ];
        for (channel, settings) in channels {
            settings
                .validate()
                .map_err(|source| ValidationError::Noise { channel, source })?;
        }

        let set = self.biome_set()?;
        self.water.resolve(&set)?;
        self.lods.check_chunk_size(world.chunk_size)?;
        Ok(())
    }

    /// The biome list as a validated set, sorted by `(min height, min temperature)`.
    pub fn biome_set(&self) -> Result<BiomeSet, ValidationError> {
        Ok(BiomeSet::new_sorted(self.biomes.clone())?)
    }
}

impl WaterConfig {
    /// Look up the configured water roles in `set`.
    ///
    /// Returns `None` when no water biomes are configured.
    pub fn resolve(&self, set: &BiomeSet) -> Result<Option<ResolvedWater>, ValidationError> {
        let lookup = |role: &'static str, name: Option<&str>| {
            name.map(|name| {
                set.lookup_by_name(name)
                    .ok_or_else(|| ValidationError::UnknownWaterBiome {
                        role,
                        name: name.to_string(),
                    })
            })
            .transpose()
        };

        let deep_ocean = lookup("deep_ocean", self.deep_ocean.as_deref())?;
        let shallows = lookup("shallows", self.shallows.as_deref())?;
        let beach = lookup("beach", self.beach.as_deref())?;

        match (deep_ocean, shallows) {
            (Some(deep_ocean), Some(shallows)) => Ok(Some(ResolvedWater {
                levels: WaterLevels {
                    deep_ocean,
                    shallows,
                },
                beach,
                beach_mode: self.beach_mode,
            })),
            (None, None) if beach.is_none() => Ok(None),
            _ => Err(ValidationError::IncompleteWater),
        }
    }
}
