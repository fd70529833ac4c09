//! Biome classification: band containment, nearest-fit scoring and biome-map assembly.

use terragen_noise::ScalarGrid;

use crate::{Biome, BiomeGrid, BiomeId, BiomeSet};

/// Whether `(height, temperature, humidity)` lies inside all of `biome`'s bands.
#[inline]
pub fn matches(height: f32, temperature: f32, humidity: f32, biome: &Biome) -> bool {
    biome.matches(height, temperature, humidity)
}

/// The first biome, in set order, whose bands contain the sample.
pub fn first_match(height: f32, temperature: f32, humidity: f32, set: &BiomeSet) -> Option<BiomeId> {
    set.iter()
        .find(|(_, b)| b.matches(height, temperature, humidity))
        .map(|(id, _)| id)
}

/// Nearest-fit biome for a sample.
///
/// Each biome scores the Manhattan distance from the sample to its band
/// minimums, divided by `1 + weight_bias`. A biome replaces the current best
/// when its weighted score is below the best *recorded* score, and the score
/// recorded is the unweighted one. Ties go to the earlier biome. Returns
/// `None` only for an empty set.
pub fn best_match(height: f32, temperature: f32, humidity: f32, set: &BiomeSet) -> Option<BiomeId> {
    let mut best = None;
    let mut best_score = f32::MAX;
    for (id, biome) in set.iter() {
        let score = biome.score(height, temperature, humidity);
        let weighted = score / (1.0 + biome.weight_bias);
        if weighted < best_score {
            best_score = score;
            best = Some(id);
        }
    }
    best
}

/// Height thresholds taken from the water biomes' upper height bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaterLevels {
    /// Cells below this biome's max height are deep ocean.
    pub deep_ocean: BiomeId,
    /// Remaining cells below this biome's max height are shallows.
    pub shallows: BiomeId,
}

/// Classify every cell of a chunk.
///
/// With `water` set, cells under the deep-ocean level become deep ocean,
/// cells under the shallows level become shallows, and everything else uses
/// [`best_match`]. Without it every cell uses [`best_match`].
///
/// # Panics
///
/// Panics if the three grids differ in size.
pub fn classify_grid(
    height: &ScalarGrid,
    temperature: &ScalarGrid,
    humidity: &ScalarGrid,
    set: &BiomeSet,
    water: Option<WaterLevels>,
) -> BiomeGrid {
    let (w, h) = (height.width(), height.height());
    assert!(
        temperature.width() == w
            && temperature.height() == h
            && humidity.width() == w
            && humidity.height() == h,
        "channel grids must share dimensions"
    );

    let levels = water.map(|levels| {
        (
            levels,
            set.get(levels.deep_ocean).height.max,
            set.get(levels.shallows).height.max,
        )
    });

    let mut grid = BiomeGrid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let hv = height.get(x, y);
            let biome = match levels {
                Some((levels, deep_level, _)) if hv < deep_level => Some(levels.deep_ocean),
                Some((levels, _, sea_level)) if hv < sea_level => Some(levels.shallows),
                _ => best_match(hv, temperature.get(x, y), humidity.get(x, y), set),
            };
            grid.set(x, y, biome);
        }
    }

    tracing::trace!(
        width = w,
        height = h,
        unclassified = grid.unclassified_count(),
        "classified biome grid"
    );
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Band, Color};

    fn biome(name: &str, height: Band, bias: f32) -> Biome {
        Biome {
            name: name.into(),
            height,
            temperature: Band::FULL,
            humidity: Band::FULL,
            weight_bias: bias,
            color: Color::rgb(10, 20, 30),
        }
    }

    fn water_set() -> BiomeSet {
        BiomeSet::new(vec![
            biome("Deep Ocean", Band::new(0.0, 0.2), 0.0),
            biome("Shallows", Band::new(0.2, 0.3), 0.0),
            biome("Plains", Band::new(0.3, 0.7), 0.0),
            biome("Peaks", Band::new(0.7, 1.0), 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_set_is_none() {
        let set = BiomeSet::new(vec![]).unwrap();
        assert_eq!(best_match(0.5, 0.5, 0.5, &set), None);
        assert_eq!(first_match(0.5, 0.5, 0.5, &set), None);
    }

    #[test]
    fn test_best_match_prefers_closest_minimums() {
        let set = water_set();
        assert_eq!(best_match(0.75, 0.0, 0.0, &set), Some(BiomeId(3)));
        assert_eq!(best_match(0.35, 0.0, 0.0, &set), Some(BiomeId(2)));
    }

    #[test]
    fn test_ties_go_to_first_in_order() {
        let set = BiomeSet::new(vec![
            biome("A", Band::new(0.5, 0.6), 0.0),
            biome("B", Band::new(0.5, 0.9), 0.0),
        ])
        .unwrap();
        assert_eq!(best_match(0.55, 0.0, 0.0, &set), Some(BiomeId(0)));
    }

    #[test]
    fn test_bias_compares_weighted_but_records_raw_score() {
        // A scores 0.2 raw. B scores 0.3 raw, 0.15 weighted, so B takes the lead
        // and records 0.3. C scores 0.25 raw and beats the recorded 0.3 even
        // though B's weighted score was lower.
        let set = BiomeSet::new(vec![
            biome("A", Band::new(0.3, 1.0), 0.0),
            biome("B", Band::new(0.2, 1.0), 1.0),
            biome("C", Band::new(0.25, 1.0), 0.0),
        ])
        .unwrap();
        assert_eq!(best_match(0.5, 0.0, 0.0, &set), Some(BiomeId(2)));
    }

    #[test]
    fn test_first_match_uses_containment() {
        let set = water_set();
        assert_eq!(first_match(0.25, 0.5, 0.5, &set), Some(BiomeId(1)));
        // 0.3 is inside both Shallows and Plains; the earlier one wins.
        assert_eq!(first_match(0.3, 0.5, 0.5, &set), Some(BiomeId(1)));
    }

    #[test]
    fn test_single_covering_biome_classifies_every_cell() {
        let set = BiomeSet::new(vec![biome("Everything", Band::FULL, 0.0)]).unwrap();
        let h = ScalarGrid::from_fn(7, 5, |x, y| (x * y) as f64 / 24.0);
        let t = ScalarGrid::from_fn(7, 5, |x, _| x as f64 / 6.0);
        let u = ScalarGrid::from_fn(7, 5, |_, y| y as f64 / 4.0);
        let grid = classify_grid(&h, &t, &u, &set, None);
        assert!(grid.as_slice().iter().all(|&c| c == Some(BiomeId(0))));
    }

    #[test]
    fn test_water_levels_flood_low_cells() {
        let set = water_set();
        let water = WaterLevels {
            deep_ocean: BiomeId(0),
            shallows: BiomeId(1),
        };
        let h = ScalarGrid::from_fn(4, 1, |x, _| [0.1, 0.25, 0.5, 0.9][x]);
        let flat = ScalarGrid::filled(4, 1, 0.0);
        let grid = classify_grid(&h, &flat, &flat, &set, Some(water));
        assert_eq!(
            grid.as_slice(),
            &[Some(BiomeId(0)), Some(BiomeId(1)), Some(BiomeId(2)), Some(BiomeId(3))]
        );
    }

    #[test]
    fn test_level_boundary_is_not_water() {
        let set = water_set();
        let water = WaterLevels {
            deep_ocean: BiomeId(0),
            shallows: BiomeId(1),
        };
        // Exactly at the shallows max height: not flooded, falls through to best match.
        let h = ScalarGrid::filled(1, 1, 0.3);
        let flat = ScalarGrid::filled(1, 1, 0.0);
        let grid = classify_grid(&h, &flat, &flat, &set, Some(water));
        assert_eq!(grid.get(0, 0), Some(BiomeId(2)));
    }
}
