//! Seeded noise synthesis: Perlin, FBM, ridged and domain-warped fields, normalized into scalar grids.

mod curve;
mod field;
mod grid;
mod seed;
mod settings;

pub use curve::{CurveError, CurveKey, ResponseCurve, smoothstep};
pub use field::{NoiseField, estimate_noise_range, generate};
pub use grid::{ScalarGrid, sanitize};
pub use seed::{OCTAVE_OFFSET_RANGE, octave_offsets, warp_x_seed, warp_y_seed};
pub use settings::{
    MAX_FREQUENCY, MAX_OCTAVES, MAX_PADDING, MIN_SCALE, NoiseKind, NoiseSettings, NoiseSettingsError,
    NormalizeMode,
};
