//! Interfaces of the recognition collaborators driven by the benchmark.
//!
//! A [`Backend`] produces a [`FrameStream`] per simulated camera plus one
//! [`RecognitionEngine`] and one [`VehicleClassifier`] per worker thread.
//! The stream owns decoding and buffering; the harness only drains it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One decoded frame. The payload is opaque to the harness.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateCandidate {
    pub plate: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameResults {
    pub frame_index: u64,
    pub plates: Vec<PlateCandidate>,
}

/// Plate detections of consecutive frames merged into a single observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGroup {
    pub plate: String,
    pub confidence: f32,
    pub first_frame: u64,
    pub last_frame: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleClassification {
    pub group: PlateGroup,
    pub label: String,
    pub confidence: f32,
}

/// Constructor arguments shared by the engine and the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub locale: String,
    pub config_path: PathBuf,
    pub runtime_data: PathBuf,
}

pub trait RecognitionEngine: Send {
    fn recognize(&mut self, frame: &Frame) -> Result<Vec<PlateCandidate>>;
}

pub trait VehicleClassifier: Send {
    fn classify(&mut self, group: &PlateGroup) -> Result<VehicleClassification>;
}

/// Bounded, internally synchronized frame queue fed from a video file.
pub trait FrameStream: Send + Sync {
    fn connect_video_file(&self, path: &Path, frame_offset: u64) -> Result<()>;

    /// `true` while the source may still produce frames.
    fn video_file_active(&self) -> bool;

    /// Frames decoded and waiting to be processed.
    fn queue_size(&self) -> usize;

    /// Blocks until a frame is buffered, the source is exhausted, or `timeout`
    /// elapses. Returns `true` if frames are buffered on return.
    fn wait_for_frames(&self, timeout: Duration) -> bool;

    /// Pops one frame and runs `engine` over it.
    ///
    /// `Ok(None)` means the buffer was drained by another consumer.
    fn process_frame(&self, engine: &mut dyn RecognitionEngine) -> Result<Option<FrameResults>>;

    /// Classifies every plate group closed since the previous call.
    fn pop_completed_groups_and_recognize_vehicle(
        &self,
        classifier: &mut dyn VehicleClassifier,
    ) -> Vec<VehicleClassification>;
}

pub trait Backend: Send + Sync {
    type Stream: FrameStream;

    fn name(&self) -> &str;

    fn open_stream(&self, frame_queue_size: usize) -> Result<Self::Stream>;

    fn new_engine(&self, settings: &EngineSettings) -> Result<Box<dyn RecognitionEngine>>;

    fn new_classifier(&self, settings: &EngineSettings) -> Result<Box<dyn VehicleClassifier>>;
}
