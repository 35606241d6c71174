//! Frame pacing
//!
//! The simulation always advances in fixed ticks; a realtime host measures
//! wall time with [`Timer`] and asks [`FixedTimestep`] how many ticks are due.

use std::time::Instant;

/// Wall-clock frame timer used to pace a realtime host
#[derive(Debug, Clone)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Starts timing from now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
        }
    }

    /// Marks the end of a frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }

    /// Seconds between the last two updates
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}

/// Converts variable frame times into a whole number of fixed simulation ticks
///
/// Leftover time below one tick is carried into the next frame. The carry is
/// capped so a long stall does not turn into an unbounded burst of ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: f32,
    accumulator: f32,
    max_ticks_per_frame: u32,
}

impl FixedTimestep {
    /// Create a stepper for the given tick length in seconds
    pub fn new(tick: f32) -> Self {
        Self {
            tick,
            accumulator: 0.0,
            max_ticks_per_frame: 8,
        }
    }

    /// Limit how many ticks a single frame may produce
    pub fn with_max_ticks_per_frame(mut self, max_ticks: u32) -> Self {
        self.max_ticks_per_frame = max_ticks.max(1);
        self
    }

    /// Tick length in seconds
    pub fn tick(&self) -> f32 {
        self.tick
    }

    /// Feed elapsed wall time and get back how many ticks to run
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.tick && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        if ticks == self.max_ticks_per_frame {
            self.accumulator = self.accumulator.min(self.tick);
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timestep_carries_remainder() {
        let mut stepper = FixedTimestep::new(0.25);
        assert_eq!(stepper.advance(0.3), 1);
        assert_eq!(stepper.advance(0.3), 1);
        assert_eq!(stepper.advance(0.0), 0);
    }

    #[test]
    fn test_fixed_timestep_caps_bursts() {
        let mut stepper = FixedTimestep::new(0.1).with_max_ticks_per_frame(3);
        assert_eq!(stepper.advance(10.0), 3);
        assert!(stepper.advance(0.0) <= 1);
    }

    #[test]
    fn test_timer_measures_elapsed_wall_time() {
        let mut timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        timer.update();
        assert!(timer.delta_time() >= 0.005);
    }
}
