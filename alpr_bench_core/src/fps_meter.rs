use std::time::Instant;

/// Frame rate between consecutive readings of a monotonically growing counter.
pub struct FpsMeter {
    last_count: u64,
    last_time: Instant,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self {
            last_count: 0,
            last_time: Instant::now(),
        }
    }
}

impl FpsMeter {
    pub fn get_fps(&mut self, total: u64) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_time).as_secs_f64();
        let frames = total.saturating_sub(self.last_count);
        self.last_time = now;
        self.last_count = total;
        if elapsed > 0.0 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }
}
