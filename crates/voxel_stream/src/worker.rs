//! Background meshing thread.
//!
//! Decoding and meshing a full 128x128x30 frame is the heaviest path in the
//! dashboard, so it runs off the interactive thread. Frames arrive without
//! flow control: when several are waiting, only the newest is meshed and the
//! rest are counted as dropped. Results come back whole, never partially.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::error::FrameError;
use crate::pipeline::build_terrain;
use crate::terrain::TerrainMesh;

/// Outcome of one background pass.
pub type WorkerResult = Result<TerrainMesh, FrameError>;

struct FrameRequest {
    generation: u64,
    bytes: Vec<u8>,
}

/// Handle to the meshing thread.
///
/// Dropping the handle closes the request channel and joins the thread.
pub struct FrameWorker {
    request_tx: Option<Sender<FrameRequest>>,
    result_rx: Receiver<WorkerResult>,
    worker: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
    next_generation: u64,
}

impl FrameWorker {
    /// Start the worker thread.
    pub fn spawn(config: StreamConfig) -> Self {
        let (request_tx, request_rx) = channel::<FrameRequest>();
        let (result_tx, result_rx) = channel::<WorkerResult>();
        let dropped = Arc::new(AtomicU64::new(0));
        let worker_dropped = Arc::clone(&dropped);

        let worker = thread::spawn(move || {
            while let Ok(mut request) = request_rx.recv() {
                // Keep only the newest pending frame.
                loop {
                    match request_rx.try_recv() {
                        Ok(newer) => {
                            worker_dropped.fetch_add(1, Ordering::Relaxed);
                            request = newer;
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }

                let start = Instant::now();
                let result = build_terrain(&request.bytes, &config, request.generation)
                    .map(|(terrain, _)| terrain);
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                match &result {
                    Ok(terrain) => debug!(
                        generation = terrain.generation,
                        voxels = terrain.mesh.voxel_count(),
                        elapsed_ms,
                        "meshed voxel frame"
                    ),
                    Err(err) => warn!(generation = request.generation, error = %err, "dropping voxel frame"),
                }
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx: Some(request_tx),
            result_rx,
            worker: Some(worker),
            dropped,
            next_generation: 0,
        }
    }

    /// Queue a frame for meshing. Never blocks.
    ///
    /// Returns the generation assigned to the frame, or `None` if the worker
    /// has stopped.
    pub fn submit(&mut self, bytes: Vec<u8>) -> Option<u64> {
        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.request_tx.as_ref()?;
        tx.send(FrameRequest { generation, bytes }).ok()?;
        Some(generation)
    }

    /// Take a finished result without waiting.
    pub fn try_recv(&self) -> Option<WorkerResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for a finished result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Frames skipped because a newer one arrived before meshing began.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
