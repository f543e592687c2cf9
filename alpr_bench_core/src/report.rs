use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::resolution::Resolution;
use crate::worker::WorkerStats;

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub resolution: Resolution,
    pub frames: u64,
    #[serde(skip)]
    pub elapsed: Duration,
    pub elapsed_secs: f64,
    pub fps: f64,
    pub interrupted: bool,
    pub failed_frames: u64,
    pub vehicles: u64,
}

impl ResolutionReport {
    pub fn new(
        resolution: Resolution,
        frames: u64,
        elapsed: Duration,
        interrupted: bool,
        stats: WorkerStats,
    ) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let fps = if elapsed_secs > 0.0 {
            frames as f64 / elapsed_secs
        } else {
            0.0
        };
        Self {
            resolution,
            frames,
            elapsed,
            elapsed_secs,
            fps,
            interrupted,
            failed_frames: stats.failed_frames,
            vehicles: stats.vehicles,
        }
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t{} = {:.1} fps ({} frames)",
            self.resolution, self.fps, self.frames
        )?;
        if self.interrupted {
            write!(f, " [interrupted]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchSummary {
    pub backend: String,
    pub streams: usize,
    pub workers: usize,
    pub interrupted: bool,
    pub reports: Vec<ResolutionReport>,
}

impl BenchSummary {
    pub fn total_frames(&self) -> u64 {
        self.reports.iter().map(|r| r.frames).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let report = ResolutionReport::new(
            Resolution::Vga,
            500,
            Duration::from_secs(4),
            false,
            WorkerStats::default(),
        );
        assert_eq!(report.fps, 125.0);
        assert_eq!(report.to_string(), "\tvga = 125.0 fps (500 frames)");
    }

    #[test]
    fn interrupted_runs_are_marked() {
        let report = ResolutionReport::new(
            Resolution::Uhd4k,
            10,
            Duration::from_millis(500),
            true,
            WorkerStats::default(),
        );
        assert_eq!(report.to_string(), "\t4k = 20.0 fps (10 frames) [interrupted]");
    }

    #[test]
    fn zero_elapsed_yields_zero_fps() {
        let report = ResolutionReport::new(
            Resolution::Hd720,
            3,
            Duration::ZERO,
            false,
            WorkerStats::default(),
        );
        assert_eq!(report.fps, 0.0);
    }

    #[test]
    fn summary_serializes_labels() {
        let summary = BenchSummary {
            backend: "synthetic".to_string(),
            streams: 1,
            workers: 2,
            interrupted: false,
            reports: vec![ResolutionReport::new(
                Resolution::Hd1080,
                40,
                Duration::from_secs(2),
                false,
                WorkerStats::default(),
            )],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["reports"][0]["resolution"], "1080p");
        assert_eq!(json["reports"][0]["fps"], 20.0);
        assert!(json["reports"][0].get("elapsed").is_none());
        assert_eq!(summary.total_frames(), 40);
    }
}
