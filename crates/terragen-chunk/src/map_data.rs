//! Per-chunk snapshot of every generated channel.

use terragen_biome::{BiomeGrid, Color};
use terragen_noise::ScalarGrid;

/// Layout version of [`MapData`]. Bump when a channel is added or changes meaning.
pub const FORMAT_VERSION: u32 = 1;

/// Names of the scalar channels, in the order [`MapData::channel`] accepts them.
pub const CHANNEL_NAMES: [&str; 4] = ["height", "temperature", "humidity", "ridges"];

/// Immutable result of map generation for one chunk origin.
///
/// All grids share the same dimensions. Workers build it in one piece and
/// hand it to the driver behind an `Arc`; nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct MapData {
    origin: [f64; 2],
    height: ScalarGrid,
    temperature: ScalarGrid,
    humidity: ScalarGrid,
    ridges: Option<ScalarGrid>,
    biomes: BiomeGrid,
    colors: Vec<Color>,
}

impl MapData {
    pub(crate) fn new(
        origin: [f64; 2],
        height: ScalarGrid,
        temperature: ScalarGrid,
        humidity: ScalarGrid,
        ridges: Option<ScalarGrid>,
        biomes: BiomeGrid,
        colors: Vec<Color>,
    ) -> Self {
        debug_assert_eq!(colors.len(), height.len());
        Self {
            origin,
            height,
            temperature,
            humidity,
            ridges,
            biomes,
            colors,
        }
    }

    /// Layout version this snapshot was built with.
    pub fn version(&self) -> u32 {
        FORMAT_VERSION
    }

    /// Origin the chunk was generated at, in grid units.
    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// `(width, height)` of every grid.
    pub fn size(&self) -> (usize, usize) {
        (self.height.width(), self.height.height())
    }

    /// Final height in `[0, 1]`, ridges already blended in.
    pub fn height(&self) -> &ScalarGrid {
        &self.height
    }

    pub fn temperature(&self) -> &ScalarGrid {
        &self.temperature
    }

    pub fn humidity(&self) -> &ScalarGrid {
        &self.humidity
    }

    /// Ridge detail after its curve and intensity; absent when ridges are disabled.
    pub fn ridges(&self) -> Option<&ScalarGrid> {
        self.ridges.as_ref()
    }

    /// Post-processed biome assignment.
    pub fn biomes(&self) -> &BiomeGrid {
        &self.biomes
    }

    /// Row-major biome colors; unclassified cells are magenta.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Look up a scalar channel by name.
    pub fn channel(&self, name: &str) -> Option<&ScalarGrid> {
        match name {
            "height" => Some(&self.height),
            "temperature" => Some(&self.temperature),
            "humidity" => Some(&self.humidity),
            "ridges" => self.ridges.as_ref(),
            _ => None,
        }
    }
}
