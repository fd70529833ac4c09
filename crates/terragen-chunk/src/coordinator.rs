//! Asynchronous map and mesh generation on a fixed worker pool.
//!
//! The driver submits requests with a completion callback. Workers only see
//! the job and send `(RequestId, result)` back over a channel; callbacks stay
//! on the driver and run inside [`ChunkCoordinator::drain_completions`], so
//! they never cross threads and get mutable access to the driver's context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use hashbrown::HashMap;
use terragen_mesh::MeshData;

use crate::map_data::MapData;
use crate::session::GenerationSession;

/// Handle returned by every request; pass it to [`ChunkCoordinator::cancel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Callback run on the driver when map data arrives.
pub type MapCallback<C> = Box<dyn FnOnce(&mut C, Arc<MapData>)>;

/// Callback run on the driver when mesh data arrives.
pub type MeshCallback<C> = Box<dyn FnOnce(&mut C, Arc<MeshData>)>;

enum Work {
    Map { origin: [f64; 2] },
    Mesh { map: Arc<MapData>, lod: u32 },
}

struct Job {
    id: RequestId,
    cancelled: Arc<AtomicBool>,
    work: Work,
}

enum Output {
    Map(Arc<MapData>),
    Mesh(Arc<MeshData>),
    /// The build panicked; the request is dropped without running its callback.
    Failed,
}

struct Completion {
    id: RequestId,
    output: Output,
}

enum Callback<C> {
    Map(MapCallback<C>),
    Mesh(MeshCallback<C>),
}

struct Pending<C> {
    callback: Callback<C>,
    cancelled: Arc<AtomicBool>,
}

/// Default pool size: one worker per core, leaving one for the driver.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Schedules map-data and mesh-data builds and delivers their results.
///
/// Results arrive in completion order, not request order. Every live request
/// has its callback run exactly once by [`drain_completions`]; cancelled
/// requests never do.
///
/// [`drain_completions`]: ChunkCoordinator::drain_completions
pub struct ChunkCoordinator<C> {
    session: Arc<GenerationSession>,
    job_sender: Option<Sender<Job>>,
    completion_receiver: Receiver<Completion>,
    workers: Vec<JoinHandle<()>>,
    pending: HashMap<RequestId, Pending<C>>,
    next_id: u64,
    failed: usize,
}

impl<C> ChunkCoordinator<C> {
    /// Start `worker_count` workers (at least one) sharing `session`.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn a worker thread.
    pub fn new(session: Arc<GenerationSession>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (job_sender, job_receiver) = crossbeam_channel::unbounded::<Job>();
        let (completion_sender, completion_receiver) = crossbeam_channel::unbounded();

        let workers = (0..worker_count)
            .map(|index| {
                let jobs = job_receiver.clone();
                let completions = completion_sender.clone();
                let session = Arc::clone(&session);
                std::thread::Builder::new()
                    .name(format!("terragen-worker-{index}"))
                    .spawn(move || run_worker(&session, &jobs, &completions))
                    .expect("failed to spawn terragen worker thread")
            })
            .collect();

        tracing::debug!(workers = worker_count, "chunk coordinator started");

        Self {
            session,
            job_sender: Some(job_sender),
            completion_receiver,
            workers,
            pending: HashMap::new(),
            next_id: 0,
            failed: 0,
        }
    }

    /// Start a pool sized by [`default_worker_count`].
    pub fn with_default_workers(session: Arc<GenerationSession>) -> Self {
        Self::new(session, default_worker_count())
    }

    /// Session shared with the workers.
    pub fn session(&self) -> &Arc<GenerationSession> {
        &self.session
    }

    /// Generate map data for the chunk at `origin`.
    pub fn request_map_data(
        &mut self,
        origin: [f64; 2],
        on_complete: impl FnOnce(&mut C, Arc<MapData>) + 'static,
    ) -> RequestId {
        self.submit(Work::Map { origin }, Callback::Map(Box::new(on_complete)))
    }

    /// Build the mesh of `map` at `lod`.
    pub fn request_mesh_data(
        &mut self,
        map: Arc<MapData>,
        lod: u32,
        on_complete: impl FnOnce(&mut C, Arc<MeshData>) + 'static,
    ) -> RequestId {
        self.submit(Work::Mesh { map, lod }, Callback::Mesh(Box::new(on_complete)))
    }

    fn submit(&mut self, work: Work, callback: Callback<C>) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));

        let job = Job {
            id,
            cancelled: Arc::clone(&cancelled),
            work,
        };
        let sent = self
            .job_sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok());
        if sent {
            self.pending.insert(id, Pending { callback, cancelled });
        } else {
            tracing::warn!(?id, "worker pool is shut down; request dropped");
        }
        id
    }

    /// Drop interest in `id`. Returns `false` if it already completed or was cancelled.
    ///
    /// A job that has not started is skipped by the worker; a result that
    /// arrives anyway is discarded on drain.
    pub fn cancel(&mut self, id: RequestId) -> bool {
        match self.pending.remove(&id) {
            Some(pending) => {
                pending.cancelled.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Run the callbacks of every completion received so far. Returns how many ran.
    ///
    /// Call from the driver, typically once per frame.
    pub fn drain_completions(&mut self, ctx: &mut C) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.completion_receiver.try_recv() {
            let Some(pending) = self.pending.remove(&completion.id) else {
                continue;
            };
            match (pending.callback, completion.output) {
                (Callback::Map(callback), Output::Map(map)) => callback(ctx, map),
                (Callback::Mesh(callback), Output::Mesh(mesh)) => callback(ctx, mesh),
                (_, Output::Failed) => {
                    self.failed += 1;
                    tracing::error!(id = ?completion.id, "build failed; request dropped");
                    continue;
                }
                _ => {
                    tracing::warn!(id = ?completion.id, "completion kind does not match request");
                    continue;
                }
            }
            delivered += 1;
        }
        delivered
    }

    /// Requests submitted but not yet delivered or cancelled.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `id` was submitted and has been neither delivered nor cancelled.
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Requests dropped because their build panicked.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Close the job queue and join every worker. Pending callbacks are dropped.
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        self.pending.clear();
    }
}

impl<C> Drop for ChunkCoordinator<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(session: &GenerationSession, jobs: &Receiver<Job>, completions: &Sender<Completion>) {
    while let Ok(job) = jobs.recv() {
        if job.cancelled.load(Ordering::Relaxed) {
            continue;
        }
        let output = guarded(|| match job.work {
            Work::Map { origin } => Output::Map(Arc::new(session.generate_map_data(origin))),
            Work::Mesh { map, lod } => Output::Mesh(Arc::new(session.build_mesh(&map, lod))),
        })
        .unwrap_or(Output::Failed);
        if job.cancelled.load(Ordering::Relaxed) {
            continue;
        }
        if completions.send(Completion { id: job.id, output }).is_err() {
            break;
        }
    }
}

/// Run `build`, turning a panic into `None` so the worker survives it.
fn guarded<T>(build: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(build)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            tracing::error!(%message, "worker build panicked");
            None
        }
    }
}
