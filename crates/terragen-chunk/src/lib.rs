//! Chunk generation: the per-session pipeline, the worker pool that runs it
//! off the driver thread, and the driver-side chunk cache.

mod cache;
mod coordinator;
mod map_data;
mod session;

pub use cache::{Arrivals, CacheStats, Chunk, ChunkCache, LodMesh, PollSummary};
pub use coordinator::{ChunkCoordinator, MapCallback, MeshCallback, RequestId, default_worker_count};
pub use map_data::{CHANNEL_NAMES, FORMAT_VERSION, MapData};
pub use session::{ChunkCoord, GenerationSession};
