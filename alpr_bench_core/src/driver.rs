use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};

use crate::cancellation::CancellationToken;
use crate::configuration::BenchConfiguration;
use crate::counter::FrameCounter;
use crate::fetcher::VideoFile;
use crate::fps_meter::FpsMeter;
use crate::report::{BenchSummary, ResolutionReport};
use crate::resolution::Resolution;
use crate::stream::{Backend, FrameStream};
use crate::worker::{WorkerPool, WorkerStats};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Running,
    Draining,
    Reported,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Benchmarks the videos one after another, isolating every measurement.
pub struct BenchDriver<B> {
    backend: B,
    configuration: BenchConfiguration,
    token: CancellationToken,
    counter: FrameCounter,
    state: RunState,
}

impl<B: Backend> BenchDriver<B> {
    pub fn new(backend: B, configuration: BenchConfiguration, token: CancellationToken) -> Self {
        Self {
            backend,
            configuration,
            token,
            counter: FrameCounter::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn configuration(&self) -> &BenchConfiguration {
        &self.configuration
    }

    fn transition(&mut self, resolution: Resolution, next: RunState) {
        debug!(target: "alpr_bench::driver", "{}: {} -> {}", resolution, self.state, next);
        self.state = next;
    }

    /// Runs every video in order. `on_report` sees each result as soon as it
    /// is measured. A cancelled run is reported and ends the benchmark.
    pub fn run<F>(&mut self, videos: &[VideoFile], mut on_report: F) -> Result<BenchSummary>
    where
        F: FnMut(&ResolutionReport),
    {
        let workers = WorkerPool::new(
            self.configuration.workers(),
            self.configuration.poll_interval(),
        );
        if !videos.is_empty() {
            info!(target: "alpr_bench::driver",
                "Benchmarking on {} threads over {} stream(s) with the {} backend...",
                workers.workers(),
                self.configuration.streams(),
                self.backend.name());
        }

        let mut reports = Vec::with_capacity(videos.len());
        let mut interrupted = false;
        for (position, video) in videos.iter().enumerate() {
            if self.token.is_cancelled() {
                interrupted = true;
                break;
            }
            let report = match self.run_video(video, &workers) {
                Ok(report) => report,
                Err(e) => {
                    self.transition(video.resolution, RunState::Idle);
                    return Err(e);
                }
            };
            on_report(&report);
            interrupted = report.interrupted;
            reports.push(report);
            if interrupted {
                let skipped = videos.len() - position - 1;
                if skipped > 0 {
                    warn!(target: "alpr_bench::driver",
                        "Run interrupted, skipping {} remaining resolution(s)", skipped);
                }
                break;
            }
        }

        Ok(BenchSummary {
            backend: self.backend.name().to_string(),
            streams: self.configuration.streams(),
            workers: workers.workers(),
            interrupted,
            reports,
        })
    }

    fn run_video(&mut self, video: &VideoFile, workers: &WorkerPool) -> Result<ResolutionReport> {
        let resolution = video.resolution;
        self.transition(resolution, RunState::Connecting);
        let mut streams = Vec::with_capacity(self.configuration.streams());
        for _ in 0..self.configuration.streams() {
            let stream = self
                .backend
                .open_stream(self.configuration.frame_queue_size())?;
            stream.connect_video_file(&video.path, 0)?;
            streams.push(stream);
        }
        self.counter.reset();

        self.transition(resolution, RunState::Running);
        let settings = self.configuration.engine_settings();
        let progress_interval = self.configuration.progress_interval();
        let start = Instant::now();

        self.transition(resolution, RunState::Draining);
        let (done_tx, done_rx) = crossbeam::channel::bounded::<()>(0);
        let backend = &self.backend;
        let counter = &self.counter;
        let token = &self.token;
        let worker_stats = thread::scope(|s| {
            if let Some(interval) = progress_interval {
                s.spawn(move || log_progress(resolution, counter, done_rx, interval));
            }
            let stats = workers.run(backend, &settings, &streams, counter, token);
            drop(done_tx);
            stats
        })?;
        let elapsed = start.elapsed();
        drop(streams);

        let mut stats = WorkerStats::default();
        for worker in worker_stats {
            stats += worker;
        }
        let report = ResolutionReport::new(
            resolution,
            self.counter.get(),
            elapsed,
            self.token.is_cancelled(),
            stats,
        );
        self.transition(resolution, RunState::Reported);
        Ok(report)
    }
}

fn log_progress(
    resolution: Resolution,
    counter: &FrameCounter,
    done: Receiver<()>,
    interval: Duration,
) {
    let mut meter = FpsMeter::default();
    loop {
        match done.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let total = counter.get();
                info!(target: "alpr_bench::driver",
                    "\t{}: {:.1} fps ({} frames so far)", resolution, meter.get_fps(total), total);
            }
            _ => break,
        }
    }
}
