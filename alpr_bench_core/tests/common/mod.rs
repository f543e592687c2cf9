#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use alpr_bench_core::cancellation::CancellationToken;
use alpr_bench_core::configuration::{BenchConfiguration, BenchConfigurationBuilder};
use alpr_bench_core::driver::BenchDriver;
use alpr_bench_core::platform::Platform;
use alpr_bench_core::stream::{
    Backend, EngineSettings, Frame, FrameResults, FrameStream, PlateCandidate, PlateGroup,
    RecognitionEngine, VehicleClassification, VehicleClassifier,
};
use alpr_bench_core::{BenchError, Result};

struct StubState {
    connected: Option<(PathBuf, Instant)>,
    emitted: u64,
}

/// Stream "decoding" one frame every `period`, up to `total` frames or forever.
pub struct StubStream {
    total: Option<u64>,
    period: Duration,
    state: Mutex<StubState>,
}

impl StubStream {
    pub fn new(total: Option<u64>, period: Duration) -> Self {
        Self {
            total,
            period,
            state: Mutex::new(StubState {
                connected: None,
                emitted: 0,
            }),
        }
    }

    fn decoded(&self, state: &StubState) -> u64 {
        let Some((_, since)) = &state.connected else {
            return 0;
        };
        let by_time = if self.period.is_zero() {
            u64::MAX
        } else {
            (since.elapsed().as_nanos() / self.period.as_nanos()) as u64
        };
        match self.total {
            Some(total) => by_time.min(total),
            None => by_time,
        }
    }

    fn buffered(&self, state: &StubState) -> u64 {
        self.decoded(state).saturating_sub(state.emitted)
    }

    fn active(&self, state: &StubState) -> bool {
        state.connected.is_some()
            && match self.total {
                Some(total) => self.decoded(state) < total,
                None => true,
            }
    }
}

impl FrameStream for StubStream {
    fn connect_video_file(&self, path: &Path, _frame_offset: u64) -> Result<()> {
        let mut state = self.state.lock();
        state.connected = Some((path.to_path_buf(), Instant::now()));
        state.emitted = 0;
        Ok(())
    }

    fn video_file_active(&self) -> bool {
        let state = self.state.lock();
        self.active(&state)
    }

    fn queue_size(&self) -> usize {
        let state = self.state.lock();
        self.buffered(&state).min(usize::MAX as u64) as usize
    }

    fn wait_for_frames(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let state = self.state.lock();
                if self.buffered(&state) > 0 {
                    return true;
                }
                if !self.active(&state) {
                    return false;
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(Duration::from_millis(1)));
        }
    }

    fn process_frame(&self, engine: &mut dyn RecognitionEngine) -> Result<Option<FrameResults>> {
        let index = {
            let mut state = self.state.lock();
            if self.buffered(&state) == 0 {
                return Ok(None);
            }
            state.emitted += 1;
            state.emitted - 1
        };
        let frame = Frame {
            index,
            data: index.to_le_bytes().to_vec(),
        };
        let plates = engine.recognize(&frame)?;
        Ok(Some(FrameResults {
            frame_index: index,
            plates,
        }))
    }

    fn pop_completed_groups_and_recognize_vehicle(
        &self,
        _classifier: &mut dyn VehicleClassifier,
    ) -> Vec<VehicleClassification> {
        Vec::new()
    }
}

pub struct StubEngine {
    calls: Arc<AtomicU64>,
    delay: Duration,
    panic_on_frame: Option<u64>,
}

impl RecognitionEngine for StubEngine {
    fn recognize(&mut self, frame: &Frame) -> Result<Vec<PlateCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_frame == Some(frame.index) {
            panic!("stub engine crashed on frame {}", frame.index);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(vec![PlateCandidate {
            plate: "STUB001".to_string(),
            confidence: 90.0,
        }])
    }
}

pub struct StubClassifier;

impl VehicleClassifier for StubClassifier {
    fn classify(&mut self, group: &PlateGroup) -> Result<VehicleClassification> {
        Ok(VehicleClassification {
            group: group.clone(),
            label: "sedan".to_string(),
            confidence: 90.0,
        })
    }
}

pub struct StubBackend {
    pub total: Option<u64>,
    pub period: Duration,
    pub engine_delay: Duration,
    pub engine_calls: Arc<AtomicU64>,
    pub engines_created: Arc<AtomicU64>,
    /// Zero-based engine construction that fails.
    pub fail_engine_at: Option<u64>,
    pub panic_on_frame: Option<u64>,
}

impl StubBackend {
    pub fn finite(total: u64, period: Duration) -> Self {
        Self {
            total: Some(total),
            period,
            engine_delay: Duration::ZERO,
            engine_calls: Arc::default(),
            engines_created: Arc::default(),
            fail_engine_at: None,
            panic_on_frame: None,
        }
    }

    pub fn endless(period: Duration) -> Self {
        Self {
            total: None,
            ..Self::finite(0, period)
        }
    }
}

impl Backend for StubBackend {
    type Stream = StubStream;

    fn name(&self) -> &str {
        "stub"
    }

    fn open_stream(&self, _frame_queue_size: usize) -> Result<StubStream> {
        Ok(StubStream::new(self.total, self.period))
    }

    fn new_engine(&self, _settings: &EngineSettings) -> Result<Box<dyn RecognitionEngine>> {
        let created = self.engines_created.fetch_add(1, Ordering::SeqCst);
        if self.fail_engine_at == Some(created) {
            return Err(BenchError::Engine(format!("engine {} failed to load", created)));
        }
        Ok(Box::new(StubEngine {
            calls: self.engine_calls.clone(),
            delay: self.engine_delay,
            panic_on_frame: self.panic_on_frame,
        }))
    }

    fn new_classifier(&self, _settings: &EngineSettings) -> Result<Box<dyn VehicleClassifier>> {
        Ok(Box::new(StubClassifier))
    }
}

pub fn configuration(workers: usize, poll_interval: Duration) -> BenchConfiguration {
    BenchConfigurationBuilder::for_platform(Platform::Linux)
        .workers(workers)
        .poll_interval(poll_interval)
        .build()
        .unwrap()
}

pub fn stub_driver(
    backend: StubBackend,
    workers: usize,
    poll_interval: Duration,
) -> BenchDriver<StubBackend> {
    BenchDriver::new(
        backend,
        configuration(workers, poll_interval),
        CancellationToken::new(),
    )
}
