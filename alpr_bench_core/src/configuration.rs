use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use url::Url;

use crate::platform::Platform;
use crate::resolution::Resolution;
use crate::stream::EngineSettings;
use crate::BenchError;

pub const DEFAULT_ENDPOINT: &str = "http://download.openalpr.com/bench/";
pub const DEFAULT_LOCALE: &str = "us";
pub const DEFAULT_FRAME_QUEUE_SIZE: usize = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("alprbench")
}

pub fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url")
}

/// Number of processing cores visible to the process.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Settings of one benchmark invocation. Built once, never mutated.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct BenchConfiguration {
    #[builder(default = "1")]
    streams: usize,
    #[builder(default = "available_workers()")]
    workers: usize,
    #[builder(default = "Resolution::ALL.to_vec()")]
    resolutions: Vec<Resolution>,
    #[builder(default = "default_download_dir()")]
    download_dir: PathBuf,
    runtime_data: PathBuf,
    engine_config: PathBuf,
    #[builder(default)]
    quiet: bool,
    #[builder(default = "DEFAULT_LOCALE.to_string()")]
    locale: String,
    #[builder(default = "DEFAULT_FRAME_QUEUE_SIZE")]
    frame_queue_size: usize,
    #[builder(default = "DEFAULT_POLL_INTERVAL")]
    poll_interval: Duration,
    /// Interval of the live FPS log line, `None` disables it.
    #[builder(default)]
    progress_interval: Option<Duration>,
    #[builder(default = "default_endpoint()")]
    endpoint: Url,
}

impl BenchConfigurationBuilder {
    /// Builder with the engine paths pre-filled for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let mut builder = Self::default();
        builder
            .runtime_data(platform.default_runtime_data())
            .engine_config(platform.default_engine_config());
        builder
    }

    fn validate(&self) -> Result<(), String> {
        if self.streams == Some(0) {
            return Err("stream count must be at least 1".to_string());
        }
        if self.workers == Some(0) {
            return Err("worker count must be at least 1".to_string());
        }
        if self.frame_queue_size == Some(0) {
            return Err("frame queue size must be at least 1".to_string());
        }
        if self.poll_interval == Some(Duration::ZERO) {
            return Err("poll interval must be positive".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if endpoint.cannot_be_a_base() {
                return Err(format!("endpoint {} cannot be used as a base url", endpoint));
            }
        }
        Ok(())
    }
}

impl From<BenchConfigurationBuilderError> for BenchError {
    fn from(e: BenchConfigurationBuilderError) -> Self {
        BenchError::InvalidConfiguration(e.to_string())
    }
}

impl BenchConfiguration {
    pub fn streams(&self) -> usize {
        self.streams
    }

    /// Worker threads per run, never fewer than one per stream.
    pub fn workers(&self) -> usize {
        self.workers.max(self.streams)
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn runtime_data(&self) -> &Path {
        &self.runtime_data
    }

    pub fn engine_config(&self) -> &Path {
        &self.engine_config
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn frame_queue_size(&self) -> usize {
        self.frame_queue_size
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Live progress period, always `None` in quiet mode.
    pub fn progress_interval(&self) -> Option<Duration> {
        if self.quiet {
            None
        } else {
            self.progress_interval
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            locale: self.locale.clone(),
            config_path: self.engine_config.clone(),
            runtime_data: self.runtime_data.clone(),
        }
    }
}
