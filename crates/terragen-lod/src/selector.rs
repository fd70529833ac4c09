//! Distance-based LOD selection over an ordered table of detail levels.

use serde::{Deserialize, Serialize};

/// One row of the LOD table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    /// Simplification factor passed to the mesh builder. 0 is full detail.
    pub lod: u32,
    /// Largest viewer distance at which this level is still used.
    pub visible_distance: f64,
}

impl LodLevel {
    /// Shorthand constructor.
    pub const fn new(lod: u32, visible_distance: f64) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }
}

/// Errors from building or checking a [`LodTable`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    /// The table has no levels.
    #[error("LOD table must have at least one level")]
    Empty,
    /// A threshold is NaN, infinite or not positive.
    #[error("LOD level {0} has an invalid visible distance")]
    InvalidDistance(usize),
    /// Thresholds are not strictly increasing.
    #[error("LOD level {0} threshold is not greater than the previous level's")]
    NotIncreasing(usize),
    /// The level's simplification step does not evenly divide the grid edge.
    #[error("LOD {lod} (step {step}) does not divide chunk edge {edge}")]
    StepMismatch {
        /// Offending LOD factor.
        lod: u32,
        /// Its simplification step.
        step: usize,
        /// `chunk_size - 1`.
        edge: usize,
    },
}

/// Simplification step for a LOD factor: 1 at LOD 0, otherwise `lod * 2`.
#[inline]
pub fn simplification_step(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Sampled vertices along an edge of `grid_size` cells at `lod`.
#[inline]
pub fn vertices_per_line(grid_size: usize, lod: u32) -> usize {
    grid_size.saturating_sub(1) / simplification_step(lod) + 1
}

/// Ordered `(lod, visible_distance)` levels, nearest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LodLevel>", into = "Vec<LodLevel>")]
pub struct LodTable {
    levels: Vec<LodLevel>,
}

impl LodTable {
    /// Build a table, rejecting empty tables and non-increasing thresholds.
    pub fn new(levels: Vec<LodLevel>) -> Result<Self, LodError> {
        if levels.is_empty() {
            return Err(LodError::Empty);
        }
        for (i, level) in levels.iter().enumerate() {
            let d = level.visible_distance;
            if !d.is_finite() || d <= 0.0 {
                return Err(LodError::InvalidDistance(i));
            }
            if i > 0 && d <= levels[i - 1].visible_distance {
                return Err(LodError::NotIncreasing(i));
            }
        }
        Ok(Self { levels })
    }

    /// The levels, nearest first.
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false`; a table has at least one level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The last level's threshold. Chunks farther than this are not shown.
    pub fn max_view_distance(&self) -> f64 {
        self.levels[self.levels.len() - 1].visible_distance
    }

    /// Whether a chunk at `distance` is within view.
    pub fn is_visible(&self, distance: f64) -> bool {
        distance <= self.max_view_distance()
    }

    /// Index of the level to use at `distance`.
    ///
    /// Walks the table while the distance is beyond the current level's
    /// threshold. The last level is the fallback, so the result is always a
    /// valid index.
    pub fn select(&self, distance: f64) -> usize {
        let last = self.levels.len() - 1;
        self.levels[..last]
            .iter()
            .position(|level| distance <= level.visible_distance)
            .unwrap_or(last)
    }

    /// Check that every level's step evenly divides `chunk_size - 1`.
    pub fn check_chunk_size(&self, chunk_size: usize) -> Result<(), LodError> {
        let edge = chunk_size.saturating_sub(1);
        for level in &self.levels {
            let step = simplification_step(level.lod);
            if edge % step != 0 {
                return Err(LodError::StepMismatch {
                    lod: level.lod,
                    step,
                    edge,
                });
            }
        }
        Ok(())
    }
}

impl Default for LodTable {
    fn default() -> Self {
        Self {
            levels: vec![
                LodLevel::new(0, 200.0),
                LodLevel::new(2, 400.0),
                LodLevel::new(4, 600.0),
            ],
        }
    }
}

impl TryFrom<Vec<LodLevel>> for LodTable {
    type Error = LodError;

    fn try_from(levels: Vec<LodLevel>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LodTable> for Vec<LodLevel> {
    fn from(table: LodTable) -> Self {
        table.levels
    }
}
