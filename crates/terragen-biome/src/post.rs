//! Post-processing of classified grids: small-region pruning, beach carving,
//! height re-clamping and color map output.
//!
//! Every pass reads its input grid and returns a new one.

use serde::{Deserialize, Serialize};
use terragen_noise::ScalarGrid;

use crate::{BiomeGrid, BiomeId, BiomeSet, Color};

/// Which shallows tiles seed beach carving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeachMode {
    /// Every shallows tile.
    #[default]
    AllShallows,
    /// Only shallows tiles 4-adjacent to deep ocean.
    Shoreline,
}

/// Reassign every 4-connected same-biome region smaller than `min_region_size`
/// to the biome that borders it most often.
///
/// Border counts are taken over all region tiles, so a neighbour touching two
/// region tiles counts twice. Ties go to the biome seen first. Regions with
/// no classified neighbour, and unclassified regions, are left unchanged.
pub fn prune(grid: &BiomeGrid, min_region_size: usize) -> BiomeGrid {
    let (width, height) = (grid.width(), grid.height());
    let mut output = grid.clone();
    let mut visited = vec![false; width * height];

    let mut stack = Vec::new();
    let mut region = Vec::new();
    let mut tally: Vec<(BiomeId, usize)> = Vec::new();
    let mut reassigned = 0usize;

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] {
                continue;
            }
            let biome = grid.get(x, y);

            region.clear();
            stack.push((x, y));
            visited[y * width + x] = true;
            while let Some((cx, cy)) = stack.pop() {
                region.push((cx, cy));
                for (nx, ny) in grid.neighbors4(cx, cy) {
                    let ni = ny * width + nx;
                    if !visited[ni] && grid.get(nx, ny) == biome {
                        visited[ni] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if biome.is_none() || region.len() >= min_region_size {
                continue;
            }

            tally.clear();
            for &(cx, cy) in &region {
                for (nx, ny) in grid.neighbors4(cx, cy) {
                    let Some(neighbor) = grid.get(nx, ny) else {
                        continue;
                    };
                    if Some(neighbor) == biome {
                        continue;
                    }
                    match tally.iter_mut().find(|(id, _)| *id == neighbor) {
                        Some((_, count)) => *count += 1,
                        None => tally.push((neighbor, 1)),
                    }
                }
            }

            let mut winner: Option<(BiomeId, usize)> = None;
            for &(id, count) in &tally {
                if winner.is_none_or(|(_, best)| count > best) {
                    winner = Some((id, count));
                }
            }
            let Some((replacement, _)) = winner else {
                continue;
            };

            for &(tx, ty) in &region {
                output.set(tx, ty, Some(replacement));
            }
            reassigned += region.len();
        }
    }

    tracing::trace!(min_region_size, reassigned, "pruned small biome regions");
    output
}

/// Turn land tiles bordering shallows into beach.
///
/// Land is any classified tile that is neither shallows nor deep ocean.
/// Sources are picked by `mode`; only their 4-neighbours are converted, so
/// beaches are one tile wide.
pub fn carve_beach(
    grid: &BiomeGrid,
    shallows: BiomeId,
    beach: BiomeId,
    deep_ocean: BiomeId,
    mode: BeachMode,
) -> BiomeGrid {
    let (width, height) = (grid.width(), grid.height());
    let mut output = grid.clone();
    let is_land = |b: Option<BiomeId>| matches!(b, Some(id) if id != shallows && id != deep_ocean);

    for y in 0..height {
        for x in 0..width {
            if grid.get(x, y) != Some(shallows) {
                continue;
            }
            if mode == BeachMode::Shoreline
                && !grid
                    .neighbors4(x, y)
                    .any(|(nx, ny)| grid.get(nx, ny) == Some(deep_ocean))
            {
                continue;
            }
            for (nx, ny) in grid.neighbors4(x, y) {
                if is_land(grid.get(nx, ny)) {
                    output.set(nx, ny, Some(beach));
                }
            }
        }
    }
    output
}

/// Clamp each classified cell's height into its biome's height band.
/// Unclassified cells keep their height.
///
/// # Panics
///
/// Panics if the grids differ in size.
pub fn reapply_height_by_biome(height: &ScalarGrid, biomes: &BiomeGrid, set: &BiomeSet) -> ScalarGrid {
    assert!(
        height.width() == biomes.width() && height.height() == biomes.height(),
        "height and biome grids must share dimensions"
    );
    let mut corrected = height.clone();
    for y in 0..height.height() {
        for x in 0..height.width() {
            if let Some(id) = biomes.get(x, y) {
                corrected.set(x, y, set.get(id).height.clamp(height.get(x, y)));
            }
        }
    }
    corrected
}

/// Row-major colors for a biome grid; unclassified cells are [`Color::MAGENTA`].
pub fn color_map(grid: &BiomeGrid, set: &BiomeSet) -> Vec<Color> {
    grid.as_slice()
        .iter()
        .map(|cell| cell.map_or(Color::MAGENTA, |id| set.get(id).color))
        .collect()
}
