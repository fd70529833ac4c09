//! Biome definition: band ranges, tie-break bias and display color.

use serde::{Deserialize, Serialize};

/// 8-bit RGB display color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Sentinel color for unclassified cells.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    /// Shorthand constructor.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend from `self` (at 0) to `other` (at 1); `t` is clamped.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Closed `[min, max]` interval on one classification axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Inclusive lower bound.
    pub min: f32,
    /// Inclusive upper bound.
    pub max: f32,
}

impl Band {
    /// Shorthand constructor.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The whole unit interval.
    pub const FULL: Self = Self::new(0.0, 1.0);

    /// Whether `value` lies inside the band, bounds included.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// `value` clamped into the band.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    /// Human-readable biome name, unique within a set (e.g. "Shallows").
    pub name: String,
    /// Height band.
    pub height: Band,
    /// Temperature band.
    pub temperature: Band,
    /// Humidity band.
    pub humidity: Band,
    /// Tie-break bias in `[0, 1]`. Higher values make the biome win nearest-fit ties more often.
    #[serde(default)]
    pub weight_bias: f32,
    /// Color written to the color map.
    pub color: Color,
}

impl Biome {
    /// Whether `(height, temperature, humidity)` lies inside all three bands.
    pub fn matches(&self, height: f32, temperature: f32, humidity: f32) -> bool {
        self.height.contains(height)
            && self.temperature.contains(temperature)
            && self.humidity.contains(humidity)
    }

    /// Distance of a sample from this biome's lower band corner.
    pub fn score(&self, height: f32, temperature: f32, humidity: f32) -> f32 {
        (height - self.height.min).abs()
            + (temperature - self.temperature.min).abs()
            + (humidity - self.humidity.min).abs()
    }

    /// The three bands with their axis names.
    pub fn bands(&self) -> [(&'static str, Band); 3] {
        [
            ("height", self.height),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains() -> Biome {
        Biome {
            name: "Plains".into(),
            height: Band::new(0.4, 0.6),
            temperature: Band::new(0.3, 0.7),
            humidity: Band::new(0.2, 0.5),
            weight_bias: 0.0,
            color: Color::rgb(90, 160, 60),
        }
    }

    #[test]
    fn test_matches_inclusive_bounds() {
        let b = plains();
        assert!(b.matches(0.4, 0.3, 0.2));
        assert!(b.matches(0.6, 0.7, 0.5));
        assert!(b.matches(0.5, 0.5, 0.3));
    }

    #[test]
    fn test_outside_any_band_fails() {
        let b = plains();
        assert!(!b.matches(0.39, 0.5, 0.3));
        assert!(!b.matches(0.5, 0.71, 0.3));
        assert!(!b.matches(0.5, 0.5, 0.51));
        assert!(!b.matches(f32::NAN, 0.5, 0.3));
    }

    #[test]
    fn test_score_is_manhattan_from_minimums() {
        let b = plains();
        let s = b.score(0.5, 0.3, 0.4);
        assert!((s - 0.3).abs() < 1e-6, "score {s}");
    }

    #[test]
    fn test_color_lerp() {
        let black = Color::rgb(0, 0, 0);
        let white = Color::rgb(255, 255, 255);
        assert_eq!(black.lerp(white, 0.0), black);
        assert_eq!(black.lerp(white, 1.0), white);
        assert_eq!(black.lerp(white, 0.5), Color::rgb(128, 128, 128));
        assert_eq!(black.lerp(white, 7.0), white);
    }
}
