//! Timing services the sensor driver expects from the host.

use std::time::{Duration, Instant};

pub trait Clock {
    fn sleep_us(&self, us: u64);

    /// Microseconds since an arbitrary fixed origin; only differences matter.
    fn now_us(&self) -> u64;
}

/// Monotonic clock counting from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn sleep_us(&self, us: u64) {
        std::thread::sleep(Duration::from_micros(us));
    }

    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
