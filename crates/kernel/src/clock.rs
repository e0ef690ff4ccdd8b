use web_time::Instant;

/// Source of elapsed time in seconds, queried once per frame.
pub trait Clock {
    /// Seconds since the clock started.
    fn elapsed(&mut self) -> f64;
}

/// Wall clock backed by `Instant`. Works in the browser through `web-time`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for SystemClock {
    fn elapsed(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to. Used for headless traces and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, seconds: f64) {
        self.now = seconds;
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }
}

impl Clock for ManualClock {
    fn elapsed(&mut self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let mut clock = ManualClock::new();
        assert_eq!(clock.elapsed(), 0.0);
        clock.advance(0.25);
        clock.advance(0.25);
        assert_eq!(clock.elapsed(), 0.5);
        clock.set(2.0);
        assert_eq!(clock.elapsed(), 2.0);
    }

    #[test]
    fn system_clock_is_non_negative() {
        let mut clock = SystemClock::start();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
