use std::time::{Duration, Instant};

/// Wall-clock stopwatch for the informal GPU vs CPU comparison.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whole milliseconds since `start`, matching the demos' `Total ms` lines.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

    /// Runs `f` and returns its result with the time it took.
    pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Duration) {
        let sw = Self::start();
        let out = f();
        (out, sw.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_returns_value() {
        let (v, d) = Stopwatch::measure(|| 21 * 2);
        assert_eq!(v, 42);
        assert!(d < Duration::from_secs(5));
    }
}
