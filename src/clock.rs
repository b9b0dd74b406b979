use std::time::Instant;

/// Minimal wall clock for the frame loop: tracks delta time and total
/// elapsed seconds since creation. The elapsed time drives the oscillation
/// phase of the animated objects.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
}

impl Clock {
    /// Create a new clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the last tick; advances the clock.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009 && delta <= 0.050);
    }

    #[test]
    fn elapsed_accumulates_across_ticks() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(5));
        clock.tick();
        thread::sleep(Duration::from_millis(5));
        clock.tick();

        assert!(clock.elapsed() >= 0.009);
    }
}
