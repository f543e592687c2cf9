pub mod cancellation;
pub mod configuration;
pub mod counter;
pub mod driver;
pub mod fetcher;
pub mod fps_meter;
pub mod platform;
pub mod report;
pub mod resolution;
pub mod stream;
/// Stand-in collaborators used when no native recognition library is wired in.
pub mod synthetic;
pub mod worker;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Detected OS other than Linux or Windows: {0}")]
    UnsupportedPlatform(String),
    #[error("Unsupported resolution {0:?}, expected one of vga, 720p, 1080p, 4k or all")]
    InvalidResolution(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build the http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("Failed to download {url}: server responded with {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("Invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("Frame stream error: {0}")]
    Stream(String),
    #[error("Recognition engine error: {0}")]
    Engine(String),
    #[error("A worker thread panicked")]
    WorkerPanicked,
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

/// CRC32 of the payload, used by the synthetic backend as its unit of work.
pub fn fast_hash(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
