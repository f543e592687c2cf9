use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use url::Url;

use crate::cancellation::CancellationToken;
use crate::resolution::Resolution;
use crate::{BenchError, Result};

/// Local copy of the benchmark video for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub resolution: Resolution,
    pub path: PathBuf,
}

/// Retrieves a remote file into `dest`, returning the number of bytes written.
pub trait Transport {
    fn fetch(&self, url: &Url, dest: &Path) -> Result<u64>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(BenchError::HttpClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &Url, dest: &Path) -> Result<u64> {
        let download_error = |source: reqwest::Error| BenchError::Download {
            url: url.to_string(),
            source,
        };
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(download_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BenchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let file = File::create(dest).map_err(|e| BenchError::io(dest, e))?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(&mut response, &mut writer).map_err(|e| BenchError::io(dest, e))?;
        writer.flush().map_err(|e| BenchError::io(dest, e))?;
        Ok(written)
    }
}

pub struct VideoFetcher<T> {
    endpoint: Url,
    download_dir: PathBuf,
    transport: T,
    token: Option<CancellationToken>,
}

impl<T: Transport> VideoFetcher<T> {
    pub fn new(endpoint: &Url, download_dir: impl Into<PathBuf>, transport: T) -> Self {
        let mut endpoint = endpoint.clone();
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Self {
            endpoint,
            download_dir: download_dir.into(),
            transport,
            token: None,
        }
    }

    /// Stops `ensure` before the next download once `token` is cancelled.
    /// A transfer already in flight runs to completion.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Makes sure a video exists locally for every resolution, downloading
    /// only the missing ones. Paths are returned in the requested order,
    /// truncated at the first download skipped due to cancellation.
    pub fn ensure(&self, resolutions: &[Resolution]) -> Result<Vec<VideoFile>> {
        if resolutions.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.download_dir)
            .map_err(|e| BenchError::io(&self.download_dir, e))?;

        info!(target: "alpr_bench::fetcher", "Downloading benchmark videos...");
        let mut videos = Vec::with_capacity(resolutions.len());
        for &resolution in resolutions {
            let path = self.download_dir.join(resolution.file_name());
            if path.is_file() {
                info!(target: "alpr_bench::fetcher", "\tFound local {}", resolution);
            } else {
                if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
                    warn!(target: "alpr_bench::fetcher",
                        "Interrupted, skipping the download of {}", resolution);
                    break;
                }
                let url = self.endpoint.join(resolution.file_name())?;
                let bytes = self.download(&url, &path)?;
                info!(target: "alpr_bench::fetcher",
                    "\tDownloaded {} ({} bytes)", resolution, bytes);
            }
            videos.push(VideoFile { resolution, path });
        }
        Ok(videos)
    }

    fn download(&self, url: &Url, path: &Path) -> Result<u64> {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);
        let bytes = match self.transport.fetch(url, &partial) {
            Ok(bytes) => bytes,
            Err(e) => {
                _ = fs::remove_file(&partial);
                return Err(e);
            }
        };
        fs::rename(&partial, path).map_err(|e| BenchError::io(path, e))?;
        Ok(bytes)
    }
}
