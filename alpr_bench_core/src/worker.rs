use std::thread;
use std::time::Duration;

use log::debug;

use crate::cancellation::CancellationToken;
use crate::counter::FrameCounter;
use crate::stream::{Backend, EngineSettings, FrameStream, RecognitionEngine, VehicleClassifier};
use crate::{BenchError, Result};

/// Tally of a single worker, summed by the driver for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub frames: u64,
    pub failed_frames: u64,
    pub vehicles: u64,
}

impl std::ops::AddAssign for WorkerStats {
    fn add_assign(&mut self, rhs: Self) {
        self.frames += rhs.frames;
        self.failed_frames += rhs.failed_frames;
        self.vehicles += rhs.vehicles;
    }
}

/// Drains `stream` until it is exhausted or `token` is cancelled.
///
/// Every successfully recognized frame bumps `counter` exactly once. Failed
/// frames are dropped from the count.
pub fn run_worker<S: FrameStream + ?Sized>(
    id: usize,
    stream: &S,
    engine: &mut dyn RecognitionEngine,
    classifier: &mut dyn VehicleClassifier,
    counter: &FrameCounter,
    token: &CancellationToken,
    poll_interval: Duration,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    while stream.video_file_active() || stream.queue_size() > 0 {
        if token.is_cancelled() {
            debug!(target: "alpr_bench::worker", "Worker {} observed cancellation", id);
            break;
        }
        if stream.queue_size() == 0 && !stream.wait_for_frames(poll_interval) {
            continue;
        }
        stats.vehicles += stream
            .pop_completed_groups_and_recognize_vehicle(classifier)
            .len() as u64;
        match stream.process_frame(engine) {
            Ok(Some(_)) => {
                counter.increment();
                stats.frames += 1;
            }
            Ok(None) => {}
            Err(e) => {
                debug!(target: "alpr_bench::worker",
                    "Worker {} failed to process a frame: {}", id, e);
                stats.failed_frames += 1;
            }
        }
    }
    if !token.is_cancelled() {
        stats.vehicles += stream
            .pop_completed_groups_and_recognize_vehicle(classifier)
            .len() as u64;
    }
    stats
}

/// Fixed number of threads spread round-robin over the connected streams.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(workers: usize, poll_interval: Duration) -> Self {
        Self {
            workers: workers.max(1),
            poll_interval,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs the pool to completion. Per-worker engines are created up front so
    /// construction failures surface before any frame is consumed.
    pub fn run<B: Backend>(
        &self,
        backend: &B,
        settings: &EngineSettings,
        streams: &[B::Stream],
        counter: &FrameCounter,
        token: &CancellationToken,
    ) -> Result<Vec<WorkerStats>> {
        if streams.is_empty() {
            return Err(BenchError::InvalidConfiguration(
                "worker pool needs at least one stream".to_string(),
            ));
        }
        let mut instances = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let engine = backend.new_engine(settings)?;
            let classifier = backend.new_classifier(settings)?;
            instances.push((engine, classifier));
        }

        let poll_interval = self.poll_interval;
        thread::scope(|s| {
            let handles: Vec<_> = instances
                .into_iter()
                .enumerate()
                .map(|(id, (mut engine, mut classifier))| {
                    let stream = &streams[id % streams.len()];
                    s.spawn(move || {
                        run_worker(
                            id,
                            stream,
                            engine.as_mut(),
                            classifier.as_mut(),
                            counter,
                            token,
                            poll_interval,
                        )
                    })
                })
                .collect();
            // join every handle before reporting so no panic escapes the scope
            let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            joined
                .into_iter()
                .map(|r| r.map_err(|_| BenchError::WorkerPanicked))
                .collect()
        })
    }
}
