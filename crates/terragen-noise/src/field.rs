//! Seeded multi-octave noise fields over a 2D grid.
//!
//! Every generator follows the same pipeline: accumulate octaves of Perlin
//! noise into raw `f64` samples, replace non-finite samples, then map the
//! result into `[0, 1]` according to the caller's [`NormalizeMode`].

use noise::{NoiseFn, Perlin};

use crate::grid::{ScalarGrid, clamp_unit, min_max, normalize_min_max, normalize_to_range, sanitize};
use crate::seed::{octave_offsets, warp_x_seed, warp_y_seed};
use crate::settings::{NoiseKind, NoiseSettings, NormalizeMode};

/// A noise generator bound to one [`NoiseSettings`].
///
/// Construction builds the Perlin permutation table and draws the per-octave
/// offsets once; [`NoiseField::generate`] can then be called for any number
/// of chunk origins.
#[derive(Clone, Debug)]
pub struct NoiseField {
    settings: NoiseSettings,
    perlin: Perlin,
    offsets: Vec<[f64; 2]>,
    warp: Option<Box<WarpFields>>,
}

/// Auxiliary displacement fields for [`NoiseKind::DomainWarp`].
#[derive(Clone, Debug)]
struct WarpFields {
    x: NoiseField,
    y: NoiseField,
}

impl NoiseField {
    /// Create a field for `settings`.
    pub fn new(settings: NoiseSettings) -> Self {
        let octaves = match settings.kind {
            NoiseKind::Perlin => 1,
            _ => settings.octaves,
        };
        let offsets = octave_offsets(settings.seed, octaves, [0.0, 0.0]);
        let perlin = Perlin::new(settings.seed as u32);

        let warp = (settings.kind == NoiseKind::DomainWarp).then(|| {
            let warp_settings = |kind, seed| NoiseSettings {
                kind,
                seed,
                scale: settings.warp_scale,
                ..settings.clone()
            };
            Box::new(WarpFields {
                x: NoiseField::new(warp_settings(NoiseKind::Fbm, warp_x_seed(settings.seed))),
                y: NoiseField::new(warp_settings(NoiseKind::Ridge, warp_y_seed(settings.seed))),
            })
        });

        Self {
            settings,
            perlin,
            offsets,
            warp,
        }
    }

    /// The settings this field was built from.
    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Border added around domain-warped grids before trimming.
    pub fn padding(&self) -> usize {
        self.settings.padding.max(self.settings.required_padding()) as usize
    }

    /// Generate a `width x height` grid of values in `[0, 1]` around `origin`.
    ///
    /// `origin` is in grid cells; the settings' own offset is added to it.
    pub fn generate(
        &self,
        origin: [f64; 2],
        mode: NormalizeMode,
        width: usize,
        height: usize,
    ) -> ScalarGrid {
        if self.settings.kind == NoiseKind::DomainWarp {
            return self.generate_warped(origin, mode, width, height);
        }

        let mut raw = self.accumulate(self.world_origin(origin), width, height);
        sanitize(&mut raw, width, height);

        match (self.settings.kind, mode) {
            (NoiseKind::Perlin, _) | (_, NormalizeMode::Local) => normalize_min_max(&mut raw),
            (_, NormalizeMode::Global) => {
                for v in &mut raw {
                    *v = clamp_unit(*v * *v);
                }
            }
            (_, NormalizeMode::None) => {}
        }
        ScalarGrid::from_unit_values(width, height, &raw)
    }

    /// Extremes of the raw, pre-normalization samples over a `size x size`
    /// area at the world origin.
    pub fn estimate_range(&self, size: usize) -> (f64, f64) {
        let mut raw = match self.settings.kind {
            NoiseKind::DomainWarp => self.warped_raw([0.0, 0.0], NormalizeMode::Global, size, size),
            _ => self.accumulate(self.world_origin([0.0, 0.0]), size, size),
        };
        sanitize(&mut raw, size, size);
        let range = min_max(&raw);
        tracing::debug!(
            kind = ?self.settings.kind,
            seed = self.settings.seed,
            size,
            min = range.0,
            max = range.1,
            "estimated noise range"
        );
        range
    }

    fn world_origin(&self, origin: [f64; 2]) -> [f64; 2] {
        [
            origin[0] + self.settings.offset[0],
            origin[1] + self.settings.offset[1],
        ]
    }

    /// Perlin sample remapped from `[-1, 1]` to `[0, 1]`.
    #[inline]
    fn perlin01(&self, x: f64, y: f64) -> f64 {
        ((self.perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Raw octave accumulation for the non-warped kinds.
    fn accumulate(&self, origin: [f64; 2], width: usize, height: usize) -> Vec<f64> {
        let scale = self.settings.effective_scale();
        let half_w = width as f64 / 2.0;
        let half_h = height as f64 / 2.0;
        let offsets: Vec<[f64; 2]> = self
            .offsets
            .iter()
            .map(|o| [o[0] + origin[0], o[1] - origin[1]])
            .collect();

        let mut raw = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let cx = x as f64 - half_w;
                let cy = y as f64 - half_h;

                if self.settings.kind == NoiseKind::Perlin {
                    let o = offsets[0];
                    let p = self.perlin01((cx + o[0]) / scale, (cy + o[1]) / scale);
                    raw.push(p * 2.0 - 1.0);
                    continue;
                }

                let mut amplitude = 1.0;
                let mut frequency = 1.0;
                let mut total = 0.0;
                let mut total_amplitude = 0.0;
                for o in &offsets {
                    let sx = (cx + o[0]) / scale * frequency;
                    let sy = (cy + o[1]) / scale * frequency;
                    let p = self.perlin01(sx, sy);
                    let signed = (p * 2.0 - 1.0).abs();
                    let v = match self.settings.kind {
                        NoiseKind::Ridge => 1.0 - signed,
                        _ => signed,
                    };
                    total += v * amplitude;
                    total_amplitude += amplitude;
                    amplitude *= self.settings.persistence;
                    frequency *= self.settings.lacunarity;
                }
                raw.push(if total_amplitude > 0.0 {
                    total / total_amplitude
                } else {
                    0.0
                });
            }
        }
        raw
    }

    fn generate_warped(
        &self,
        origin: [f64; 2],
        mode: NormalizeMode,
        width: usize,
        height: usize,
    ) -> ScalarGrid {
        let pad = self.padding();
        let padded_w = width + 2 * pad;
        let padded_h = height + 2 * pad;

        let mut raw = self.warped_raw(origin, mode, padded_w, padded_h);
        sanitize(&mut raw, padded_w, padded_h);
        match (mode, self.settings.range) {
            (NormalizeMode::Global, Some((lo, hi))) => normalize_to_range(&mut raw, lo, hi),
            // The octave sum is bounded by the amplitude total.
            (NormalizeMode::Global, None) => {
                let amplitude = self.settings.max_amplitude();
                normalize_to_range(&mut raw, -amplitude, amplitude);
            }
            (NormalizeMode::Local, _) => normalize_min_max(&mut raw),
            (NormalizeMode::None, _) => {
                for v in &mut raw {
                    *v = clamp_unit(*v);
                }
            }
        }

        let mut trimmed = Vec::with_capacity(width * height);
        for row in raw.chunks_exact(padded_w).skip(pad).take(height) {
            trimmed.extend_from_slice(&row[pad..pad + width]);
        }
        ScalarGrid::from_unit_values(width, height, &trimmed)
    }

    /// Octave-summed Perlin at coordinates displaced by the warp fields.
    fn warped_raw(
        &self,
        origin: [f64; 2],
        warp_mode: NormalizeMode,
        width: usize,
        height: usize,
    ) -> Vec<f64> {
        let Some(warp) = self.warp.as_deref() else {
            return self.accumulate(self.world_origin(origin), width, height);
        };
        let warp_x = warp.x.generate(origin, warp_mode, width, height);
        let warp_y = warp.y.generate(origin, warp_mode, width, height);

        let world = self.world_origin(origin);
        let scale = self.settings.effective_scale();
        let strength = self.settings.warp_strength;
        let half_w = width as f64 / 2.0;
        let half_h = height as f64 / 2.0;

        let mut raw = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let dx = (warp_x.get(x, y) as f64 * 2.0 - 1.0) * strength;
                let dy = (warp_y.get(x, y) as f64 * 2.0 - 1.0) * strength;
                let cx = x as f64 + dx - half_w;
                let cy = y as f64 + dy - half_h;

                let mut amplitude = 1.0;
                let mut frequency = 1.0;
                let mut total = 0.0;
                for o in &self.offsets {
                    let sx = (cx + o[0] + world[0]) / scale * frequency;
                    let sy = (cy + o[1] - world[1]) / scale * frequency;
                    total += (self.perlin01(sx, sy) * 2.0 - 1.0) * amplitude;
                    amplitude *= self.settings.persistence;
                    frequency *= self.settings.lacunarity;
                }
                raw.push(total);
            }
        }
        raw
    }
}

/// Generate one normalized grid. Shorthand for [`NoiseField::new`] followed by
/// [`NoiseField::generate`].
pub fn generate(
    settings: &NoiseSettings,
    origin: [f64; 2],
    mode: NormalizeMode,
    width: usize,
    height: usize,
) -> ScalarGrid {
    NoiseField::new(settings.clone()).generate(origin, mode, width, height)
}

/// Raw range of `settings` over a `size x size` area, for [`NoiseSettings::range`].
pub fn estimate_noise_range(settings: &NoiseSettings, size: usize) -> (f64, f64) {
    NoiseField::new(settings.clone()).estimate_range(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [NoiseKind; 4] = [
        NoiseKind::Perlin,
        NoiseKind::Fbm,
        NoiseKind::Ridge,
        NoiseKind::DomainWarp,
    ];
    const MODES: [NormalizeMode; 3] = [
        NormalizeMode::Local,
        NormalizeMode::Global,
        NormalizeMode::None,
    ];

    fn settings(kind: NoiseKind, seed: i32) -> NoiseSettings {
        NoiseSettings {
            kind,
            seed,
            scale: 12.5,
            octaves: 4,
            warp_scale: 10.0,
            warp_strength: 6.0,
            ..Default::default()
        }
        .with_derived_padding()
    }

    #[test]
    fn test_generation_is_deterministic() {
        for kind in KINDS {
            let s = settings(kind, 42);
            let a = generate(&s, [3.0, -7.0], NormalizeMode::Global, 24, 16);
            let b = generate(&s, [3.0, -7.0], NormalizeMode::Global, 24, 16);
            assert_eq!(a, b, "{kind:?} must be bit-identical for equal inputs");
        }
    }

    #[test]
    fn test_all_cells_finite_and_in_unit_range() {
        for kind in KINDS {
            for mode in MODES {
                let grid = generate(&settings(kind, 9), [100.0, 50.0], mode, 20, 20);
                assert_eq!(grid.len(), 400);
                for &v in grid.as_slice() {
                    assert!(
                        v.is_finite() && (0.0..=1.0).contains(&v),
                        "{kind:?}/{mode:?} produced {v}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_domain_warp_trims_padding() {
        let s = settings(NoiseKind::DomainWarp, 5);
        assert!(NoiseField::new(s.clone()).padding() >= 3);
        let grid = generate(&s, [0.0, 0.0], NormalizeMode::Local, 17, 9);
        assert_eq!(grid.width(), 17);
        assert_eq!(grid.height(), 9);
        assert_eq!(grid.len(), 17 * 9);
    }

    #[test]
    fn test_local_mode_spans_unit_range() {
        let grid = generate(&settings(NoiseKind::Fbm, 3), [0.0, 0.0], NormalizeMode::Local, 32, 32);
        let (lo, hi) = grid.min_max().unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 1.0);
    }

    #[test]
    fn test_perlin_always_locally_normalized() {
        let s = settings(NoiseKind::Perlin, 11);
        for mode in MODES {
            let grid = generate(&s, [0.0, 0.0], mode, 32, 32);
            let (lo, hi) = grid.min_max().unwrap();
            assert_eq!((lo, hi), (0.0, 1.0), "perlin under {mode:?}");
        }
    }

    fn assert_seam_continuous(s: &NoiseSettings) {
        let left = generate(s, [0.0, 0.0], NormalizeMode::Global, 8, 8);
        let right = generate(s, [4.0, 0.0], NormalizeMode::Global, 8, 8);
        for y in 0..8 {
            for x in 0..4 {
                let a = left.get(x + 4, y);
                let b = right.get(x, y);
                assert!(
                    (a - b).abs() < 1e-5,
                    "{:?} (range {:?}) seam mismatch at ({x}, {y}): {a} vs {b}",
                    s.kind,
                    s.range
                );
            }
        }
    }

    #[test]
    fn test_global_mode_is_continuous_across_chunks() {
        for kind in [NoiseKind::Fbm, NoiseKind::Ridge, NoiseKind::DomainWarp] {
            assert_seam_continuous(&settings(kind, 77));
        }
    }

    #[test]
    fn test_domain_warp_global_with_cached_range_is_continuous() {
        let mut s = settings(NoiseKind::DomainWarp, 77);
        s.range = Some(estimate_noise_range(&s, 32));
        assert_seam_continuous(&s);
    }

    #[test]
    fn test_domain_warp_global_without_range_is_not_stretched() {
        let s = settings(NoiseKind::DomainWarp, 5);
        assert!(s.range.is_none());
        let grid = generate(&s, [0.0, 0.0], NormalizeMode::Global, 4, 4);
        let (lo, hi) = grid.min_max().unwrap();
        assert!(lo > 0.0 && hi < 1.0, "global range [{lo}, {hi}] was stretched to the window");
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(&settings(NoiseKind::Fbm, 1), [0.0, 0.0], NormalizeMode::Local, 16, 16);
        let b = generate(&settings(NoiseKind::Fbm, 2), [0.0, 0.0], NormalizeMode::Local, 16, 16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_scale_is_not_an_error() {
        let s = NoiseSettings {
            scale: 0.0,
            ..settings(NoiseKind::Fbm, 4)
        };
        let grid = generate(&s, [0.0, 0.0], NormalizeMode::None, 8, 8);
        assert!(grid.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_estimated_range_is_ordered() {
        for kind in KINDS {
            let (lo, hi) = estimate_noise_range(&settings(kind, 21), 32);
            assert!(lo.is_finite() && hi.is_finite());
            assert!(lo <= hi, "{kind:?} range inverted: {lo} > {hi}");
        }
        let (lo, hi) = estimate_noise_range(&settings(NoiseKind::Fbm, 21), 32);
        assert!(lo >= 0.0 && hi <= 1.0, "fbm raw range [{lo}, {hi}]");
    }

    #[test]
    fn test_domain_warp_uses_cached_range() {
        let mut s = settings(NoiseKind::DomainWarp, 8);
        s.range = Some(estimate_noise_range(&s, 64));
        let grid = generate(&s, [12.0, 12.0], NormalizeMode::Global, 16, 16);
        assert!(grid.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_zero_area_grid() {
        let grid = generate(&settings(NoiseKind::Ridge, 1), [0.0, 0.0], NormalizeMode::Local, 0, 5);
        assert!(grid.is_empty());
    }
}
