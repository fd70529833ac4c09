//! Noise configuration: generator kind, normalization mode and per-channel settings.

use serde::{Deserialize, Serialize};

/// Scale values at or below zero are coerced to this before sampling.
pub const MIN_SCALE: f64 = 0.001;

/// Upper bound on the octave count accepted by [`NoiseSettings::validate`].
pub const MAX_OCTAVES: u32 = 16;

/// Highest octave frequency accepted by [`NoiseSettings::validate`].
///
/// Past this the sample coordinates lose enough precision that the octave
/// contributes aliasing rather than detail.
pub const MAX_FREQUENCY: f64 = 1.0e6;

/// Largest derived domain-warp padding accepted by [`NoiseSettings::validate`].
pub const MAX_PADDING: u32 = 1024;

/// Which generator produces a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseKind {
    /// Single-octave Perlin, always locally normalized.
    Perlin,
    /// Fractal Brownian motion over absolute Perlin values.
    Fbm,
    /// Ridged multi-octave noise, `1 - |2p - 1|` per octave.
    Ridge,
    /// Octave-summed Perlin evaluated at coordinates displaced by FBM/ridge warp fields.
    DomainWarp,
}

/// How raw accumulated noise is mapped into `[0, 1]`.
///
/// There is intentionally no `Default`: picking `Local` by accident breaks
/// continuity across chunk seams, so callers always choose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Min-max over the grid produced by this call.
    Local,
    /// Fixed transform independent of the grid contents, consistent across chunks.
    Global,
    /// Clamp only.
    None,
}

/// Errors reported by [`NoiseSettings::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NoiseSettingsError {
    /// Octave count is zero.
    #[error("octave count must be at least 1")]
    NoOctaves,
    /// Octave count or lacunarity pushes the last octave's frequency out of range.
    #[error("{octaves} octaves at lacunarity {lacunarity} overflow the frequency range")]
    OctaveOverflow {
        /// Configured octave count.
        octaves: u32,
        /// Configured lacunarity.
        lacunarity: f64,
    },
    /// Persistence outside `[0, 1]`.
    #[error("persistence {0} is outside [0, 1]")]
    Persistence(f64),
    /// Lacunarity below 1.
    #[error("lacunarity {0} must be >= 1")]
    Lacunarity(f64),
    /// A parameter is NaN or infinite.
    #[error("noise parameter `{0}` is not finite")]
    NonFinite(&'static str),
    /// Domain warping needs a positive warp scale.
    #[error("domain warp scale {0} must be positive")]
    WarpScale(f64),
    /// `warp_strength / warp_scale` needs a border wider than [`MAX_PADDING`].
    #[error("domain warp needs {padding} cells of padding, more than the limit of {max}")]
    WarpPadding {
        /// Padding the settings would derive.
        padding: f64,
        /// Configured limit.
        max: u32,
    },
}

/// Parameters for one noise channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Generator used for this channel.
    pub kind: NoiseKind,
    /// Seed for the per-octave offset stream and the Perlin permutation table.
    pub seed: i32,
    /// Spatial scale in grid cells. Larger values zoom in.
    pub scale: f64,
    /// Number of octaves to accumulate.
    pub octaves: u32,
    /// Amplitude multiplier between octaves, in `[0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier between octaves, `>= 1`.
    pub lacunarity: f64,
    /// Constant offset added to every chunk origin.
    pub offset: [f64; 2],
    /// Scale of the auxiliary warp fields.
    pub warp_scale: f64,
    /// Maximum displacement, in grid cells, applied by the warp fields.
    pub warp_strength: f64,
    /// Border trimmed after domain warping. Derived, see [`NoiseSettings::with_derived_padding`].
    #[serde(skip)]
    pub padding: u32,
    /// Raw range cached by [`crate::estimate_noise_range`] for global normalization.
    #[serde(skip)]
    pub range: Option<(f64, f64)>,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Fbm,
            seed: 0,
            scale: 60.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            warp_scale: 40.0,
            warp_strength: 20.0,
            padding: 0,
            range: None,
        }
    }
}

impl NoiseSettings {
    /// Scale with the degenerate-input policy applied: `<= 0` becomes [`MIN_SCALE`].
    pub fn effective_scale(&self) -> f64 {
        coerce_scale(self.scale)
    }

    /// Warp scale with the same coercion as [`NoiseSettings::effective_scale`].
    pub fn effective_warp_scale(&self) -> f64 {
        coerce_scale(self.warp_scale)
    }

    /// Minimum border needed so warped samples never leave the padded buffer.
    pub fn required_padding(&self) -> u32 {
        (self.warp_strength.abs() / self.effective_warp_scale()).ceil() as u32 + 2
    }

    /// Returns a copy with `padding` set to [`NoiseSettings::required_padding`].
    pub fn with_derived_padding(mut self) -> Self {
        self.padding = self.required_padding();
        self
    }

    /// Sum of all octave amplitudes (geometric series with ratio `persistence`).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.octaves {
            sum += amp;
            amp *= self.persistence;
        }
        sum
    }

    /// Check structural invariants. Scale is not checked; it is coerced instead.
    pub fn validate(&self) -> Result<(), NoiseSettingsError> {
        let finite = [
            ("scale", self.scale),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
            ("offset.x", self.offset[0]),
            ("offset.y", self.offset[1]),
            ("warp_scale", self.warp_scale),
            ("warp_strength", self.warp_strength),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(NoiseSettingsError::NonFinite(name));
        }
        if self.octaves == 0 {
            return Err(NoiseSettingsError::NoOctaves);
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            return Err(NoiseSettingsError::Persistence(self.persistence));
        }
        if self.lacunarity < 1.0 {
            return Err(NoiseSettingsError::Lacunarity(self.lacunarity));
        }
        let top_frequency = self.lacunarity.powi(self.octaves as i32 - 1);
        if self.octaves > MAX_OCTAVES || !top_frequency.is_finite() || top_frequency > MAX_FREQUENCY
        {
            return Err(NoiseSettingsError::OctaveOverflow {
                octaves: self.octaves,
                lacunarity: self.lacunarity,
            });
        }
        if self.kind == NoiseKind::DomainWarp {
            if self.warp_scale <= 0.0 {
                return Err(NoiseSettingsError::WarpScale(self.warp_scale));
            }
            let padding = (self.warp_strength.abs() / self.warp_scale).ceil() + 2.0;
            if padding > MAX_PADDING as f64 {
                return Err(NoiseSettingsError::WarpPadding {
                    padding,
                    max: MAX_PADDING,
                });
            }
        }
        Ok(())
    }
}

fn coerce_scale(scale: f64) -> f64 {
    if scale <= 0.0 { MIN_SCALE } else { scale }
}
