mod engine;
mod stream;

pub use engine::{SyntheticClassifier, SyntheticEngine};
pub use stream::SyntheticStream;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stream::{Backend, EngineSettings, RecognitionEngine, VehicleClassifier};
use crate::{BenchError, Result};

fn default_frame_size() -> usize {
    64 * 1024
}

fn default_work_rounds() -> u32 {
    4
}

fn default_group_size() -> usize {
    5
}

/// Knobs of the synthetic backend.
///
/// The connected file is cut into `frame_size` byte chunks, each one standing
/// in for a decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSettings {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Simulated decode time per frame.
    #[serde(default)]
    pub decode_delay: Duration,
    /// Checksum passes over the payload per recognized frame.
    #[serde(default = "default_work_rounds")]
    pub work_rounds: u32,
    /// Consecutive frames merged into one plate group.
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default)]
    pub max_frames: Option<u64>,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            decode_delay: Duration::ZERO,
            work_rounds: default_work_rounds(),
            group_size: default_group_size(),
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticBackend {
    settings: SyntheticSettings,
}

impl SyntheticBackend {
    pub fn new(settings: SyntheticSettings) -> Result<Self> {
        if settings.frame_size == 0 {
            return Err(BenchError::InvalidConfiguration(
                "synthetic frame size must be positive".to_string(),
            ));
        }
        if settings.group_size == 0 {
            return Err(BenchError::InvalidConfiguration(
                "synthetic group size must be positive".to_string(),
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SyntheticSettings {
        &self.settings
    }
}

impl Backend for SyntheticBackend {
    type Stream = SyntheticStream;

    fn name(&self) -> &str {
        "synthetic"
    }

    fn open_stream(&self, frame_queue_size: usize) -> Result<SyntheticStream> {
        Ok(SyntheticStream::new(frame_queue_size, self.settings.clone()))
    }

    fn new_engine(&self, settings: &EngineSettings) -> Result<Box<dyn RecognitionEngine>> {
        Ok(Box::new(SyntheticEngine::new(
            &settings.locale,
            self.settings.work_rounds,
        )))
    }

    fn new_classifier(&self, _settings: &EngineSettings) -> Result<Box<dyn VehicleClassifier>> {
        Ok(Box::new(SyntheticClassifier))
    }
}
