//! Driver-side chunk store.
//!
//! Chunks are created on first request and never evicted. Map data is
//! requested once per chunk; each (chunk, LOD) mesh is built at most once and
//! only after the chunk's map data has arrived.

use std::sync::Arc;

use hashbrown::HashMap;
use terragen_mesh::MeshData;

use crate::coordinator::ChunkCoordinator;
use crate::map_data::MapData;
use crate::session::{ChunkCoord, GenerationSession};

/// Mesh state for one LOD of one chunk.
#[derive(Clone, Debug)]
pub enum LodMesh {
    /// Wanted, waiting for the chunk's map data.
    Waiting,
    /// Build in flight.
    Requested,
    /// Mesh built and stored.
    Ready(Arc<MeshData>),
}

/// One cached chunk.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    map: Option<Arc<MapData>>,
    meshes: HashMap<u32, LodMesh>,
}

impl Chunk {
    fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            map: None,
            meshes: HashMap::new(),
        }
    }

    /// Grid position of the chunk.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Map data, once it has arrived.
    pub fn map_data(&self) -> Option<&Arc<MapData>> {
        self.map.as_ref()
    }

    /// Finished mesh for `lod`, if any.
    pub fn mesh(&self, lod: u32) -> Option<&Arc<MeshData>> {
        match self.meshes.get(&lod) {
            Some(LodMesh::Ready(mesh)) => Some(mesh),
            _ => None,
        }
    }

    /// Raw state for `lod`; `None` if that LOD was never requested.
    pub fn lod_state(&self, lod: u32) -> Option<&LodMesh> {
        self.meshes.get(&lod)
    }
}

/// Counts of builds issued to the worker pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Map-data builds submitted.
    pub map_requests: usize,
    /// Mesh builds submitted, across every LOD.
    pub mesh_requests: usize,
}

/// Results collected by completion callbacks during one [`ChunkCache::poll`].
#[derive(Default)]
pub struct Arrivals {
    maps: Vec<(ChunkCoord, Arc<MapData>)>,
    meshes: Vec<(ChunkCoord, u32, Arc<MeshData>)>,
}

/// What one [`ChunkCache::poll`] stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Map data stored.
    pub maps: usize,
    /// Meshes stored.
    pub meshes: usize,
}

/// Chunk store driving a [`ChunkCoordinator`].
pub struct ChunkCache {
    coordinator: ChunkCoordinator<Arrivals>,
    chunks: HashMap<ChunkCoord, Chunk>,
    stats: CacheStats,
}

impl ChunkCache {
    /// Empty cache issuing its builds through `coordinator`.
    pub fn new(coordinator: ChunkCoordinator<Arrivals>) -> Self {
        Self {
            coordinator,
            chunks: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Cache backed by a default-sized worker pool.
    pub fn with_session(session: Arc<GenerationSession>) -> Self {
        Self::new(ChunkCoordinator::with_default_workers(session))
    }

    /// The coordinator's session.
    pub fn session(&self) -> &Arc<GenerationSession> {
        self.coordinator.session()
    }

    /// Ask for the mesh of `coord` at `lod`.
    ///
    /// Returns the cached mesh when it is ready. Otherwise makes sure the
    /// chunk's map data and this LOD's mesh are on their way, without ever
    /// issuing a second build for the same (chunk, LOD).
    pub fn request_chunk(&mut self, coord: ChunkCoord, lod: u32) -> Option<Arc<MeshData>> {
        if !self.chunks.contains_key(&coord) {
            self.chunks.insert(coord, Chunk::new(coord));
            let origin = self.coordinator.session().chunk_origin(coord);
            self.coordinator
                .request_map_data(origin, move |arrivals: &mut Arrivals, map| {
                    arrivals.maps.push((coord, map));
                });
            self.stats.map_requests += 1;
            tracing::trace!(x = coord.x, y = coord.y, "requested map data");
        }

        let chunk = self.chunks.get_mut(&coord)?;
        match chunk.meshes.get(&lod) {
            Some(LodMesh::Ready(mesh)) => return Some(Arc::clone(mesh)),
            Some(_) => return None,
            None => {}
        }

        let state = match chunk.map.clone() {
            Some(map) => {
                request_mesh(&mut self.coordinator, &mut self.stats, coord, map, lod);
                LodMesh::Requested
            }
            None => LodMesh::Waiting,
        };
        chunk.meshes.insert(lod, state);
        None
    }

    /// LOD to request for a chunk `distance` away, per the session's LOD table.
    pub fn lod_for_distance(&self, distance: f64) -> u32 {
        let lods = self.session().lods();
        lods.levels()[lods.select(distance)].lod
    }

    /// Store finished work and issue mesh builds for LODs that were waiting on map data.
    pub fn poll(&mut self) -> PollSummary {
        let mut arrivals = Arrivals::default();
        self.coordinator.drain_completions(&mut arrivals);
        let summary = PollSummary {
            maps: arrivals.maps.len(),
            meshes: arrivals.meshes.len(),
        };

        for (coord, map) in arrivals.maps {
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                continue;
            };
            chunk.map = Some(Arc::clone(&map));
            for (&lod, state) in chunk.meshes.iter_mut() {
                if matches!(state, LodMesh::Waiting) {
                    request_mesh(&mut self.coordinator, &mut self.stats, coord, Arc::clone(&map), lod);
                    *state = LodMesh::Requested;
                }
            }
        }

        for (coord, lod, mesh) in arrivals.meshes {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.meshes.insert(lod, LodMesh::Ready(mesh));
            }
        }

        if summary != PollSummary::default() {
            tracing::trace!(maps = summary.maps, meshes = summary.meshes, "chunk cache updated");
        }
        summary
    }

    /// Chunk at `coord`, if it was ever requested.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Every cached chunk, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Number of cached chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk was requested yet.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Builds issued to the pool so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Builds still in flight.
    pub fn in_flight(&self) -> usize {
        self.coordinator.in_flight()
    }

    /// Builds that panicked on a worker. Their chunks stay incomplete.
    pub fn failed(&self) -> usize {
        self.coordinator.failed()
    }
}

fn request_mesh(
    coordinator: &mut ChunkCoordinator<Arrivals>,
    stats: &mut CacheStats,
    coord: ChunkCoord,
    map: Arc<MapData>,
    lod: u32,
) {
    coordinator.request_mesh_data(map, lod, move |arrivals: &mut Arrivals, mesh| {
        arrivals.meshes.push((coord, lod, mesh));
    });
    stats.mesh_requests += 1;
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::session::tests::small_config;

    fn cache(workers: usize) -> ChunkCache {
        let session = Arc::new(GenerationSession::initialize(&small_config()).unwrap());
        ChunkCache::new(ChunkCoordinator::new(session, workers))
    }

    fn wait_for_mesh(cache: &mut ChunkCache, coord: ChunkCoord, lod: u32) -> Arc<MeshData> {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            cache.poll();
            if let Some(mesh) = cache.request_chunk(coord, lod) {
                return mesh;
            }
            assert!(Instant::now() < deadline, "mesh did not arrive in time");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_repeated_requests_build_once() {
        let mut cache = cache(2);
        let coord = ChunkCoord::new(0, 0);
        for _ in 0..3 {
            assert!(cache.request_chunk(coord, 2).is_none());
        }
        let mesh = wait_for_mesh(&mut cache, coord, 2);
        let again = cache.request_chunk(coord, 2).unwrap();
        assert!(Arc::ptr_eq(&mesh, &again));
        assert_eq!(
            cache.stats(),
            CacheStats {
                map_requests: 1,
                mesh_requests: 1
            }
        );
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn test_each_lod_gets_its_own_mesh() {
        let mut cache = cache(2);
        let coord = ChunkCoord::new(1, -1);
        let fine = wait_for_mesh(&mut cache, coord, 0);
        let coarse = wait_for_mesh(&mut cache, coord, 4);
        assert_eq!(fine.vertex_count(), 17 * 17);
        assert_eq!(coarse.vertex_count(), 3 * 3);
        assert_eq!(cache.stats().map_requests, 1);
        assert_eq!(cache.stats().mesh_requests, 2);

        let chunk = cache.chunk(coord).unwrap();
        assert!(chunk.map_data().is_some());
        assert!(chunk.mesh(0).is_some() && chunk.mesh(4).is_some());
        assert!(chunk.mesh(2).is_none());
    }

    #[test]
    fn test_waiting_lod_until_map_arrives() {
        let mut cache = cache(1);
        let coord = ChunkCoord::new(3, 3);
        cache.request_chunk(coord, 0);
        assert!(matches!(cache.chunk(coord).unwrap().lod_state(0), Some(LodMesh::Waiting)));
        assert_eq!(cache.stats().mesh_requests, 0);

        let map_origin = cache.session().chunk_origin(coord);
        wait_for_mesh(&mut cache, coord, 0);
        let map = cache.chunk(coord).unwrap().map_data().unwrap();
        assert_eq!(map.origin(), map_origin);
    }

    #[test]
    fn test_chunks_are_created_once() {
        let mut cache = cache(1);
        assert!(cache.is_empty());
        cache.request_chunk(ChunkCoord::new(0, 0), 0);
        cache.request_chunk(ChunkCoord::new(0, 0), 2);
        cache.request_chunk(ChunkCoord::new(0, 1), 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.chunks().count(), 2);
        assert_eq!(cache.stats().map_requests, 2);
    }

    #[test]
    fn test_lod_for_distance() {
        let cache = cache(1);
        assert_eq!(cache.lod_for_distance(10.0), 0);
        assert_eq!(cache.lod_for_distance(75.0), 2);
        assert_eq!(cache.lod_for_distance(1_000.0), 4);
    }
}
