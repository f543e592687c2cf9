use std::path::PathBuf;

use crate::{BenchError, Result};

const RUNTIME_DATA: &str = "/usr/share/openalpr/runtime_data";
const ENGINE_CONFIG: &str = "/usr/share/openalpr/config/openalpr.defaults.conf";
const WINDOWS_PREFIX: &str = "C:/OpenALPR/Agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(BenchError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        }
    }

    pub fn default_runtime_data(&self) -> PathBuf {
        self.prefixed(RUNTIME_DATA)
    }

    pub fn default_engine_config(&self) -> PathBuf {
        self.prefixed(ENGINE_CONFIG)
    }

    fn prefixed(&self, path: &str) -> PathBuf {
        match self {
            Platform::Linux => PathBuf::from(path),
            Platform::Windows => PathBuf::from(format!("{WINDOWS_PREFIX}{path}")),
        }
    }
}
