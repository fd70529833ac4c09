//! Biome classification and post-processing: band matching, nearest-fit scoring,
//! region pruning, beach carving and color maps.

mod classifier;
mod def;
mod grid;
mod post;
mod set;

pub use classifier::{WaterLevels, best_match, classify_grid, first_match, matches};
pub use def::{Band, Biome, Color};
pub use grid::BiomeGrid;
pub use post::{BeachMode, carve_beach, color_map, prune, reapply_height_by_biome};
pub use set::{BiomeId, BiomeSet, BiomeSetError, sort_biomes};
