//! Stitching per-chunk channels into one preview image.

use std::path::Path;

use image::{Rgb, RgbImage};
use terragen_biome::Color;
use terragen_chunk::ChunkCoord;
use terragen_noise::ScalarGrid;

/// Color ramps for the scalar channels.
pub const HEIGHT_RAMP: (Color, Color) = (Color::rgb(0, 0, 0), Color::rgb(255, 255, 255));
pub const TEMPERATURE_RAMP: (Color, Color) = (Color::rgb(0, 64, 255), Color::rgb(255, 48, 0));
pub const HUMIDITY_RAMP: (Color, Color) = (Color::rgb(200, 255, 255), Color::rgb(0, 32, 160));
pub const RIDGE_RAMP: (Color, Color) = (Color::rgb(0, 0, 0), Color::rgb(255, 220, 120));

/// Map every cell of `grid` onto the `low..high` ramp.
pub fn gradient(grid: &ScalarGrid, (low, high): (Color, Color)) -> Vec<Color> {
    grid.as_slice().iter().map(|&v| low.lerp(high, v)).collect()
}

/// A square of `(2 * radius + 1)^2` chunks centred on chunk `(0, 0)`.
///
/// Neighbouring chunks share an edge row/column, so each chunk advances the
/// image by `chunk_size - 1` pixels. Chunk Y grows upwards in the image.
pub struct Mosaic {
    radius: i32,
    stride: u32,
    image: RgbImage,
}

impl Mosaic {
    pub fn new(radius: i32, chunk_size: usize) -> Self {
        let radius = radius.max(0);
        let stride = chunk_size.saturating_sub(1) as u32;
        let side = (2 * radius as u32 + 1) * stride + 1;
        Self {
            radius,
            stride,
            image: RgbImage::new(side, side),
        }
    }

    /// Copy a chunk's row-major `colors` (`width` per row) into place.
    /// Chunks outside the radius are ignored.
    pub fn place(&mut self, coord: ChunkCoord, width: usize, colors: &[Color]) {
        if coord.x.abs() > self.radius || coord.y.abs() > self.radius || width == 0 {
            return;
        }
        let left = (coord.x + self.radius) as u32 * self.stride;
        let top = (self.radius - coord.y) as u32 * self.stride;
        for (i, color) in colors.iter().enumerate() {
            let px = left + (i % width) as u32;
            let py = top + (i / width) as u32;
            if px < self.image.width() && py < self.image.height() {
                self.image.put_pixel(px, py, Rgb([color.r, color.g, color.b]));
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        Color::rgb(r, g, b)
    }

    /// Write the mosaic as PNG.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save(path)
    }
}
