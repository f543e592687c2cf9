use std::path::Path;
use std::time::Duration;

use alpr_bench_core::configuration::{
    BenchConfiguration, BenchConfigurationBuilder, DEFAULT_FRAME_QUEUE_SIZE, DEFAULT_LOCALE,
    DEFAULT_POLL_INTERVAL,
};
use alpr_bench_core::platform::Platform;
use alpr_bench_core::synthetic::SyntheticSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use twelf::{config, Layer};

use crate::cli::Cli;

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_frame_queue_size() -> usize {
    DEFAULT_FRAME_QUEUE_SIZE
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_progress_interval() -> Option<Duration> {
    Some(Duration::from_secs(5))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineTuning {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_frame_queue_size")]
    pub frame_queue_size: usize,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Option<Duration>,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            frame_queue_size: default_frame_queue_size(),
            poll_interval: default_poll_interval(),
            progress_interval: default_progress_interval(),
        }
    }
}

#[config]
#[derive(Debug, Serialize, Clone, Default)]
pub struct BenchSettings {
    pub engine: Option<EngineTuning>,
    pub synthetic: Option<SyntheticSettings>,
}

impl BenchSettings {
    pub fn new(path: &Path) -> Result<Self> {
        let conf = Self::with_layers(&[Layer::Json(path.into())]).with_context(|| {
            format!("Failed to load benchmark settings from {}", path.display())
        })?;
        Ok(conf)
    }

    pub fn engine(&self) -> EngineTuning {
        self.engine.clone().unwrap_or_default()
    }

    pub fn synthetic(&self) -> SyntheticSettings {
        self.synthetic.clone().unwrap_or_default()
    }
}

/// Combines command line flags, tuning settings and platform defaults.
pub fn build_configuration(
    cli: &Cli,
    settings: &BenchSettings,
    platform: Platform,
) -> Result<BenchConfiguration> {
    let engine = settings.engine();
    let mut builder = BenchConfigurationBuilder::for_platform(platform);
    builder
        .streams(cli.streams)
        .resolutions(cli.resolution.resolutions().to_vec())
        .download_dir(cli.download_dir.clone())
        .quiet(cli.quiet)
        .locale(engine.locale)
        .frame_queue_size(engine.frame_queue_size)
        .poll_interval(engine.poll_interval)
        .progress_interval(engine.progress_interval);
    if let Some(workers) = cli.workers {
        builder.workers(workers);
    }
    if let Some(config) = &cli.config {
        builder.engine_config(config.clone());
    }
    if let Some(runtime) = &cli.runtime {
        builder.runtime_data(runtime.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        builder.endpoint(endpoint.clone());
    }
    let configuration = builder
        .build()
        .map_err(alpr_bench_core::BenchError::from)?;
    Ok(configuration)
}
