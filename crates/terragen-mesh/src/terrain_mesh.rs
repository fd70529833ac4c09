//! Height-grid to triangle-mesh conversion at a chosen level of detail.
//!
//! The grid is sampled every `simplification_step(lod)` cells along each axis.
//! Vertices are centred on the grid so a chunk mesh sits around its local
//! origin, with grid rows running toward -Z.

use glam::{Vec2, Vec3};
use terragen_lod::{simplification_step, vertices_per_line};
use terragen_noise::{ResponseCurve, ScalarGrid};

/// Immutable mesh output for one (chunk, LOD) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// Vertex positions, row-major over the sampled grid.
    pub positions: Vec<Vec3>,
    /// Per-vertex texture coordinates in `[0, 1)`.
    pub uvs: Vec<Vec2>,
    /// Per-vertex unit normals.
    pub normals: Vec<Vec3>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
    /// Sampled vertices per row.
    pub vertices_per_line: usize,
    /// Sampled rows.
    pub vertices_per_column: usize,
    /// LOD factor this mesh was built at.
    pub lod: u32,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recompute per-vertex normals as the normalized sum of adjacent face normals.
    ///
    /// Vertices that belong to no triangle (or only degenerate ones) get +Y.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.positions[a];
            let face = (self.positions[b] - pa).cross(self.positions[c] - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }
        self.normals = normals;
    }
}

/// Build the terrain mesh for `height` at `lod`.
///
/// Each vertex's Y is `curve(height) * height_multiplier`; the curve clamps
/// outside its key domain.
pub fn build_terrain_mesh(
    height: &ScalarGrid,
    height_multiplier: f32,
    curve: &ResponseCurve,
    lod: u32,
) -> MeshData {
    let width = height.width();
    let rows = height.height();
    let step = simplification_step(lod);

    if width == 0 || rows == 0 {
        return MeshData {
            positions: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            vertices_per_line: 0,
            vertices_per_column: 0,
            lod,
        };
    }

    let per_line = vertices_per_line(width, lod);
    let per_column = vertices_per_line(rows, lod);
    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (rows as f32 - 1.0) / 2.0;

    let vertex_count = per_line * per_column;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(per_line.saturating_sub(1) * per_column.saturating_sub(1) * 6);

    let w = per_line as u32;
    let mut vertex = 0u32;
    for (row, y) in (0..rows).step_by(step).enumerate() {
        for (col, x) in (0..width).step_by(step).enumerate() {
            let h = curve.evaluate(height.get(x, y)) * height_multiplier;
            positions.push(Vec3::new(top_left_x + x as f32, h, top_left_z - y as f32));
            uvs.push(Vec2::new(x as f32 / width as f32, y as f32 / rows as f32));

            if col + 1 < per_line && row + 1 < per_column {
                indices.extend_from_slice(&[vertex, vertex + w + 1, vertex + w]);
                indices.extend_from_slice(&[vertex + w + 1, vertex, vertex + 1]);
            }
            vertex += 1;
        }
    }

    let mut mesh = MeshData {
        positions,
        uvs,
        normals: Vec::new(),
        indices,
        vertices_per_line: per_line,
        vertices_per_column: per_column,
        lod,
    };
    mesh.recalculate_normals();

    tracing::trace!(
        lod,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "built terrain mesh"
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use terragen_noise::CurveKey;

    fn ramp(width: usize, height: usize) -> ScalarGrid {
        ScalarGrid::from_fn(width, height, |x, y| (x + y) as f64 / (width + height) as f64)
    }

    #[test]
    fn test_flat_grid_heights() {
        let grid = ScalarGrid::filled(9, 9, 0.5);
        let mesh = build_terrain_mesh(&grid, 10.0, &ResponseCurve::identity(), 0);
        for p in &mesh.positions {
            assert_eq!(p.y, 5.0, "flat 0.5 grid at multiplier 10 must give y = 5");
        }
    }

    #[test]
    fn test_vertex_and_index_counts() {
        let grid = ramp(241, 241);
        for lod in [0, 1, 2, 4, 6] {
            let mesh = build_terrain_mesh(&grid, 1.0, &ResponseCurve::identity(), lod);
            let vpl = vertices_per_line(241, lod);
            assert_eq!(mesh.vertices_per_line, vpl);
            assert_eq!(mesh.vertex_count(), vpl * vpl, "lod {lod}");
            assert_eq!(mesh.indices.len(), (vpl - 1) * (vpl - 1) * 6, "lod {lod}");
            assert_eq!(mesh.uvs.len(), mesh.vertex_count());
            assert_eq!(mesh.normals.len(), mesh.vertex_count());
        }
    }

    #[test]
    fn test_indices_stay_in_bounds() {
        // 10 - 1 is not a multiple of 4, so the last sampled column is x = 8.
        let grid = ramp(10, 7);
        let mesh = build_terrain_mesh(&grid, 3.0, &ResponseCurve::identity(), 2);
        assert_eq!(mesh.vertices_per_line, 3);
        assert_eq!(mesh.vertices_per_column, 2);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        assert_eq!(mesh.indices.len(), 2 * 6);
    }

    #[test]
    fn test_vertices_are_centered() {
        let grid = ScalarGrid::filled(5, 5, 0.0);
        let mesh = build_terrain_mesh(&grid, 1.0, &ResponseCurve::identity(), 0);
        assert_eq!(mesh.positions[0], Vec3::new(-2.0, 0.0, 2.0));
        assert_eq!(mesh.positions[24], Vec3::new(2.0, 0.0, -2.0));
        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[6], Vec2::new(0.2, 0.2));
    }

    #[test]
    fn test_first_quad_winding() {
        let grid = ScalarGrid::filled(3, 3, 0.0);
        let mesh = build_terrain_mesh(&grid, 1.0, &ResponseCurve::identity(), 0);
        assert_eq!(&mesh.indices[..6], &[0, 4, 3, 4, 0, 1]);
    }

    #[test]
    fn test_flat_mesh_normals_point_up() {
        let grid = ScalarGrid::filled(6, 6, 0.3);
        let mesh = build_terrain_mesh(&grid, 4.0, &ResponseCurve::identity(), 0);
        for n in &mesh.normals {
            assert!((*n - Vec3::Y).length() < 1e-6, "normal {n:?}");
        }
    }

    #[test]
    fn test_curve_is_applied_and_clamped() {
        let curve = ResponseCurve::from_keys(vec![CurveKey::new(0.2, 0.0), CurveKey::new(0.6, 1.0)])
            .unwrap();
        let grid = ScalarGrid::from_fn(3, 1, |x, _| [0.0, 0.4, 1.0][x]);
        let mesh = build_terrain_mesh(&grid, 2.0, &curve, 0);
        let ys: Vec<f32> = mesh.positions.iter().map(|p| p.y).collect();
        assert_eq!(ys[0], 0.0);
        assert!((ys[1] - 1.0).abs() < 1e-6);
        assert_eq!(ys[2], 2.0);
    }

    #[test]
    fn test_empty_grid_builds_empty_mesh() {
        let grid = ScalarGrid::filled(0, 0, 0.0);
        let mesh = build_terrain_mesh(&grid, 1.0, &ResponseCurve::identity(), 1);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices.is_empty());
    }
}
