//! # Background Region Generation
//!
//! Region synthesis off the calling thread.
//!
//! ```text
//!   submit(coord) ──► jobs ──► worker 0 ─┐
//!                        └──► worker 1 ──┼──► results ──► drain_completed()
//!                        └──► worker N ─┘
//! ```
//!
//! Workers share one read-only [`WorldGenerator`]. A coordinate stays
//! in flight from `submit` until its result is drained, and is never queued
//! twice meanwhile. Results arrive in completion order.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use strata_procedural::{RegionGeneration, WorldGenerator};
use strata_shared::RegionCoord;

use crate::error::{EngineError, EngineResult};

/// Worker pool producing [`RegionGeneration`]s.
#[derive(Debug)]
pub struct BackgroundGenerator {
    /// `None` once shutdown has begun.
    jobs: Option<Sender<RegionCoord>>,
    results: Receiver<RegionGeneration>,
    in_flight: Mutex<HashSet<RegionCoord>>,
    workers: Vec<JoinHandle<()>>,
}

impl BackgroundGenerator {
    /// Starts `worker_count` threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns `WorkerSpawn` if the OS refuses a thread.
    pub fn new(generator: Arc<WorldGenerator>, worker_count: usize) -> EngineResult<Self> {
        let (job_sender, job_receiver) = unbounded::<RegionCoord>();
        let (result_sender, result_receiver) = unbounded();

        let count = worker_count.max(1);
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let generator = Arc::clone(&generator);
            let jobs = job_receiver.clone();
            let results = result_sender.clone();

            let handle = std::thread::Builder::new()
                .name(format!("strata-gen-{index}"))
                .spawn(move || {
                    // Ends when every job sender is gone
                    for coord in &jobs {
                        if results.send(generator.generate_region(coord)).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| EngineError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }

        tracing::info!(workers = count, "background generation started");
        Ok(Self {
            jobs: Some(job_sender),
            results: result_receiver,
            in_flight: Mutex::new(HashSet::new()),
            workers,
        })
    }

    /// Queues a region; returns `false` if it is already in flight.
    pub fn submit(&self, coord: RegionCoord) -> bool {
        let Some(jobs) = &self.jobs else {
            return false;
        };

        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(coord) {
            return false;
        }
        if jobs.send(coord).is_err() {
            in_flight.remove(&coord);
            tracing::warn!(region = %coord, "generation workers gone, job dropped");
            return false;
        }
        true
    }

    /// Takes every finished region without blocking.
    ///
    /// Call once per frame on the owning thread.
    pub fn drain_completed(&self) -> Vec<RegionGeneration> {
        let completed: Vec<_> = self.results.try_iter().collect();
        if !completed.is_empty() {
            let mut in_flight = self.in_flight.lock();
            for generation in &completed {
                in_flight.remove(&generation.coord);
            }
        }
        completed
    }

    /// Regions queued or being generated.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Whether `coord` is queued or being generated.
    #[must_use]
    pub fn is_pending(&self, coord: RegionCoord) -> bool {
        self.in_flight.lock().contains(&coord)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for BackgroundGenerator {
    fn drop(&mut self) {
        // Closing the job channel lets each worker finish its current region
        // and exit.
        self.jobs = None;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("generation worker panicked");
            }
        }
    }
}
