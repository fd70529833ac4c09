//! Row-major scalar grids and the per-cell recovery pass for non-finite samples.

/// Offsets of the 8 neighbours, row by row.
const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A `width x height` field of finite values in `[0, 1]`.
///
/// Grids are only built from sanitized, normalized data, so every cell is
/// finite and inside the unit interval.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl ScalarGrid {
    /// A grid with every cell set to `value` (clamped into `[0, 1]`).
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        let value = clamp_unit(value as f64) as f32;
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    ///
    /// Results are sanitized and clamped, so the closure may return anything.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut raw = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                raw.push(f(x, y));
            }
        }
        sanitize(&mut raw, width, height);
        Self::from_unit_values(width, height, &raw)
    }

    /// Convert sanitized raw values, clamping each into `[0, 1]`.
    pub(crate) fn from_unit_values(width: usize, height: usize, raw: &[f64]) -> Self {
        debug_assert_eq!(raw.len(), width * height);
        Self {
            width,
            height,
            values: raw.iter().map(|&v| clamp_unit(v) as f32).collect(),
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

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.values[y * self.width + x]
    }

    /// Set `(x, y)` to `value`, clamped into `[0, 1]`. Non-finite values store 0.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let value = if value.is_finite() { value } else { 0.0 };
        self.values[y * self.width + x] = value.clamp(0.0, 1.0);
    }

    /// Row-major cell values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-area grid.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest cell value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Replace every non-finite value with the mean of its finite 8-connected
/// neighbours, or 0 when it has none.
///
/// Neighbours are read from the unmodified input, so the result does not
/// depend on scan order. Returns the number of cells replaced.
pub fn sanitize(values: &mut [f64], width: usize, height: usize) -> usize {
    debug_assert_eq!(values.len(), width * height);
    if values.iter().all(|v| v.is_finite()) {
        return 0;
    }

    let original = values.to_vec();
    let mut replaced = 0;
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            if original[idx].is_finite() {
                continue;
            }

            let mut sum = 0.0;
            let mut count = 0;
            for (dx, dy) in NEIGHBORS_8 {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let neighbor = original[ny as usize * width + nx as usize];
                if neighbor.is_finite() {
                    sum += neighbor;
                    count += 1;
                }
            }

            values[idx] = if count > 0 { sum / count as f64 } else { 0.0 };
            replaced += 1;
        }
    }

    tracing::warn!(replaced, width, height, "replaced non-finite noise samples");
    replaced
}

/// Min-max normalize in place. A flat field maps to 0.
pub(crate) fn normalize_min_max(values: &mut [f64]) {
    let (lo, hi) = min_max(values);
    normalize_to_range(values, lo, hi);
}

/// Map `[lo, hi]` onto `[0, 1]` in place, clamping outliers.
pub(crate) fn normalize_to_range(values: &mut [f64], lo: f64, hi: f64) {
    let span = hi - lo;
    for v in values.iter_mut() {
        *v = if span > 0.0 {
            clamp_unit((*v - lo) / span)
        } else {
            0.0
        };
    }
}

/// Extremes of a slice; `(0, 0)` when empty.
pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo > hi { (0.0, 0.0) } else { (lo, hi) }
}

#[inline]
pub(crate) fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
