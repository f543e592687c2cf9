use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "vga")]
    Vga,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4k")]
    Uhd4k,
}

impl Resolution {
    /// Every supported resolution, in the order the remote endpoint lists them.
    pub const ALL: [Resolution; 4] = [
        Resolution::Vga,
        Resolution::Hd720,
        Resolution::Hd1080,
        Resolution::Uhd4k,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Vga => "vga",
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
            Resolution::Uhd4k => "4k",
        }
    }

    /// Name of the benchmark video on the remote endpoint and in the download directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Resolution::Vga => "vga.webm",
            Resolution::Hd720 => "720p.mp4",
            Resolution::Hd1080 => "1080p.mp4",
            Resolution::Uhd4k => "4k.mp4",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Resolution::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| BenchError::InvalidResolution(s.to_string()))
    }
}

/// Parsed form of the `--resolution` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSelector(Vec<Resolution>);

impl ResolutionSelector {
    /// Accepts `all`, a single label, or a comma-separated list of labels.
    ///
    /// Entries are trimmed, duplicates keep their first position.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value == "all" {
            return Ok(Self(Resolution::ALL.to_vec()));
        }
        let mut resolutions = Vec::new();
        for entry in value.split(',') {
            let resolution = entry.trim().parse::<Resolution>()?;
            if !resolutions.contains(&resolution) {
                resolutions.push(resolution);
            }
        }
        Ok(Self(resolutions))
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Resolution> {
        self.0
    }
}

impl FromStr for ResolutionSelector {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
