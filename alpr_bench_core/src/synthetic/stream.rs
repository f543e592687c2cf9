use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender};
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use super::SyntheticSettings;
use crate::stream::{
    Frame, FrameResults, FrameStream, PlateCandidate, PlateGroup, RecognitionEngine,
    VehicleClassification, VehicleClassifier,
};
use crate::{BenchError, Result};

#[derive(Default)]
struct BufferState {
    frames: VecDeque<Frame>,
    active: bool,
    stop: bool,
    first_frame: u64,
    /// One past the last frame index, known once the producer is done.
    end_frame: Option<u64>,
}

#[derive(Default)]
struct PendingGroup {
    seen: u64,
    best: Option<PlateCandidate>,
    first_frame: u64,
    last_frame: u64,
}

struct Shared {
    capacity: usize,
    state: Mutex<BufferState>,
    not_empty: Condvar,
    not_full: Condvar,
    groups: Mutex<HashMap<u64, PendingGroup>>,
    completed_tx: Sender<PlateGroup>,
    completed_rx: Receiver<PlateGroup>,
}

/// Bounded frame queue filled by a background reader thread.
pub struct SyntheticStream {
    shared: Arc<Shared>,
    settings: SyntheticSettings,
    producer: Mutex<Option<JoinHandle<()>>>,
}

impl SyntheticStream {
    pub fn new(capacity: usize, settings: SyntheticSettings) -> Self {
        let (completed_tx, completed_rx) = crossbeam::channel::unbounded();
        Self {
            shared: Arc::new(Shared {
                capacity: capacity.max(1),
                state: Mutex::new(BufferState::default()),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                groups: Mutex::new(HashMap::new()),
                completed_tx,
                completed_rx,
            }),
            settings,
            producer: Mutex::new(None),
        }
    }

    fn stop_producer(&self) {
        let handle = self.producer.lock().take();
        if let Some(handle) = handle {
            {
                let mut state = self.shared.state.lock();
                state.stop = true;
            }
            self.shared.not_full.notify_all();
            if handle.join().is_err() {
                warn!(target: "alpr_bench::synthetic", "Frame producer thread panicked");
            }
        }
    }

    fn group_size(&self) -> u64 {
        self.settings.group_size.max(1) as u64
    }

    /// Accounts a consumed frame to its group. Failed frames pass no plates
    /// but still count, otherwise their group never closes.
    fn record(&self, frame_index: u64, plates: &[PlateCandidate]) {
        let group_size = self.group_size();
        let key = frame_index / group_size;
        let mut groups = self.shared.groups.lock();
        let group = groups.entry(key).or_insert_with(|| PendingGroup {
            first_frame: frame_index,
            last_frame: frame_index,
            ..Default::default()
        });
        group.seen += 1;
        group.first_frame = group.first_frame.min(frame_index);
        group.last_frame = group.last_frame.max(frame_index);
        for candidate in plates {
            let better = group
                .best
                .as_ref()
                .is_none_or(|best| candidate.confidence > best.confidence);
            if better {
                group.best = Some(candidate.clone());
            }
        }
        drop(groups);
        self.close_groups();
    }

    /// Moves every fully recognized group to the completed channel.
    fn close_groups(&self) {
        let (first, end) = {
            let state = self.shared.state.lock();
            (state.first_frame, state.end_frame)
        };
        let group_size = self.group_size();
        let mut groups = self.shared.groups.lock();
        let closed: Vec<u64> = groups
            .iter()
            .filter(|(key, group)| {
                let start = (*key * group_size).max(first);
                let mut stop = (*key + 1) * group_size;
                if let Some(end) = end {
                    stop = stop.min(end);
                }
                group.seen >= stop.saturating_sub(start)
            })
            .map(|(key, _)| *key)
            .collect();
        for key in closed {
            if let Some(group) = groups.remove(&key) {
                if let Some(best) = group.best {
                    _ = self.shared.completed_tx.send(PlateGroup {
                        plate: best.plate,
                        confidence: best.confidence,
                        first_frame: group.first_frame,
                        last_frame: group.last_frame,
                    });
                }
            }
        }
    }
}

fn produce(
    shared: Arc<Shared>,
    path: PathBuf,
    file: File,
    settings: SyntheticSettings,
    first: u64,
) {
    let mut reader = BufReader::new(file);
    let mut index = first;
    loop {
        if let Some(max_frames) = settings.max_frames {
            if index - first >= max_frames {
                break;
            }
        }
        let mut data = Vec::with_capacity(settings.frame_size);
        match (&mut reader)
            .take(settings.frame_size as u64)
            .read_to_end(&mut data)
        {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(target: "alpr_bench::synthetic",
                    "Failed to read {}: {}", path.display(), e);
                break;
            }
        }
        if !settings.decode_delay.is_zero() {
            thread::sleep(settings.decode_delay);
        }
        let mut state = shared.state.lock();
        while state.frames.len() >= shared.capacity && !state.stop {
            shared.not_full.wait(&mut state);
        }
        if state.stop {
            break;
        }
        state.frames.push_back(Frame { index, data });
        drop(state);
        shared.not_empty.notify_one();
        index += 1;
    }
    let mut state = shared.state.lock();
    state.active = false;
    state.end_frame = Some(index);
    drop(state);
    shared.not_empty.notify_all();
    debug!(target: "alpr_bench::synthetic",
        "Producer for {} finished after {} frames", path.display(), index - first);
}

impl FrameStream for SyntheticStream {
    fn connect_video_file(&self, path: &Path, frame_offset: u64) -> Result<()> {
        self.stop_producer();
        let mut file = File::open(path).map_err(|e| BenchError::io(path, e))?;
        let offset = frame_offset.saturating_mul(self.settings.frame_size as u64);
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| BenchError::io(path, e))?;

        {
            let mut state = self.shared.state.lock();
            *state = BufferState {
                active: true,
                first_frame: frame_offset,
                ..Default::default()
            };
        }
        self.shared.groups.lock().clear();
        while self.shared.completed_rx.try_recv().is_ok() {}

        let shared = self.shared.clone();
        let settings = self.settings.clone();
        let owned_path = path.to_path_buf();
        let handle = thread::Builder::new()
            .name("synthetic-decoder".to_string())
            .spawn(move || produce(shared, owned_path, file, settings, frame_offset))
            .map_err(|e| BenchError::io(path, e))?;
        *self.producer.lock() = Some(handle);
        Ok(())
    }

    fn video_file_active(&self) -> bool {
        self.shared.state.lock().active
    }

    fn queue_size(&self) -> usize {
        self.shared.state.lock().frames.len()
    }

    fn wait_for_frames(&self, timeout: Duration) -> bool {
        let mut state = self.shared.state.lock();
        if state.frames.is_empty() && state.active {
            self.shared.not_empty.wait_for(&mut state, timeout);
        }
        !state.frames.is_empty()
    }

    fn process_frame(&self, engine: &mut dyn RecognitionEngine) -> Result<Option<FrameResults>> {
        let frame = self.shared.state.lock().frames.pop_front();
        let Some(frame) = frame else {
            return Ok(None);
        };
        self.shared.not_full.notify_one();
        match engine.recognize(&frame) {
            Ok(plates) => {
                self.record(frame.index, &plates);
                Ok(Some(FrameResults {
                    frame_index: frame.index,
                    plates,
                }))
            }
            Err(e) => {
                self.record(frame.index, &[]);
                Err(e)
            }
        }
    }

    fn pop_completed_groups_and_recognize_vehicle(
        &self,
        classifier: &mut dyn VehicleClassifier,
    ) -> Vec<VehicleClassification> {
        self.close_groups();
        self.shared
            .completed_rx
            .try_iter()
            .filter_map(|group| match classifier.classify(&group) {
                Ok(classification) => Some(classification),
                Err(e) => {
                    debug!(target: "alpr_bench::synthetic",
                        "Classification of plate {} failed: {}", group.plate, e);
                    None
                }
            })
            .collect()
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop_producer();
    }
}
