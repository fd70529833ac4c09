//! Per-cell biome assignment.

use crate::BiomeId;

/// Row-major grid of optional biome references. `None` means unclassified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<BiomeId>>,
}

impl BiomeGrid {
    /// A grid with every cell unclassified.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, None)
    }

    /// A grid with every cell set to `biome`.
    pub fn filled(width: usize, height: usize, biome: Option<BiomeId>) -> Self {
        Self {
            width,
            height,
            cells: vec![biome; width * height],
        }
    }

    /// Wrap row-major cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Option<BiomeId>>) -> Self {
        assert_eq!(cells.len(), width * height, "cell count must be width * height");
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    /// Biome at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<BiomeId> {
        self.cells[self.index(x, y)]
    }

    /// Set the biome at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, biome: Option<BiomeId>) {
        let i = self.index(x, y);
        self.cells[i] = biome;
    }

    /// Row-major cells.
    pub fn as_slice(&self) -> &[Option<BiomeId>] {
        &self.cells
    }

    /// Number of unclassified cells.
    pub fn unclassified_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// In-bounds 4-neighbours of `(x, y)`.
    pub(crate) fn neighbors4(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (w, h) = (self.width, self.height);
        [
            (x.wrapping_add(1), y),
            (x.wrapping_sub(1), y),
            (x, y.wrapping_add(1)),
            (x, y.wrapping_sub(1)),
        ]
        .into_iter()
        .filter(move |&(nx, ny)| nx < w && ny < h)
    }
}
