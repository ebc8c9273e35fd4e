use std::time::{Duration, Instant};

/// Counts frames and yields an FPS figure once per reporting interval.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Records one frame. Returns `Some(fps)` when the interval has elapsed.
    pub fn frame(&mut self) -> Option<f32> {
        self.frame_at(Instant::now())
    }

    fn frame_at(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;

        let span = now.saturating_duration_since(self.window_start);
        if span <= self.interval {
            return None;
        }

        let fps = self.frames as f32 / span.as_secs_f32();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_report_inside_interval() {
        let mut fps = FpsCounter::new();
        let t = fps.window_start + Duration::from_millis(500);
        assert_eq!(fps.frame_at(t), None);
    }

    #[test]
    fn reports_and_resets_after_interval() {
        let mut fps = FpsCounter::new();
        let start = fps.window_start;
        for i in 1..60 {
            assert!(fps.frame_at(start + Duration::from_millis(i * 16)).is_none());
        }
        let v = fps.frame_at(start + Duration::from_secs(2)).unwrap();
        assert!((v - 30.0).abs() < 1e-3);
        assert_eq!(fps.frames, 0);
    }
}
