use std::path::PathBuf;

use alpr_bench_core::configuration::default_download_dir;
use alpr_bench_core::resolution::ResolutionSelector;
use clap::Parser;
use url::Url;

/// Benchmark ALPR software speed at various video resolutions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Folder to save videos
    #[arg(
        short,
        long = "download-dir",
        visible_alias = "download_dir",
        default_value_os_t = default_download_dir()
    )]
    pub download_dir: PathBuf,
    /// Suppress all output besides final results
    #[arg(short, long)]
    pub quiet: bool,
    /// Video resolution to benchmark on: vga, 720p, 1080p, 4k, all, or a comma-separated list
    #[arg(short, long, default_value = "all")]
    pub resolution: ResolutionSelector,
    /// Number of camera streams to simulate
    #[arg(short, long, default_value_t = 1)]
    pub streams: usize,
    /// Worker threads per run, defaults to the number of processing cores
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// Path to the engine config, detects Windows/Linux and uses defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Path to runtime data, detects Windows/Linux and uses defaults
    #[arg(long)]
    pub runtime: Option<PathBuf>,
    /// JSON file with engine and backend tuning
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Base url serving the benchmark videos
    #[arg(long)]
    pub endpoint: Option<Url>,
    /// Print the summary as JSON instead of one line per resolution
    #[arg(long)]
    pub json: bool,
}
