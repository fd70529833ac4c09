//! Terrain meshing: height grids to vertex/UV/normal/index buffers at a given LOD.

mod terrain_mesh;

pub use terrain_mesh::{MeshData, build_terrain_mesh};
