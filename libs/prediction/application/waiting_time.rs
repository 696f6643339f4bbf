//! Adaptive waiting time
//!
//! Delay between a round's start signal and its bet. Every failed bet pulls
//! it down by one step so the next round bets earlier, never below the floor.
//! All concurrent lifecycles share one instance; each reduction is a single
//! locked read-modify-write.

use parking_lot::Mutex;
use std::time::Duration;

pub struct WaitingTime {
    current: Mutex<Duration>,
    floor: Duration,
    step: Duration,
}

impl WaitingTime {
    /// Initial values below the floor start at the floor
    pub fn new(initial: Duration, floor: Duration, step: Duration) -> Self {
        Self {
            current: Mutex::new(initial.max(floor)),
            floor,
            step,
        }
    }

    pub fn current(&self) -> Duration {
        *self.current.lock()
    }

    /// Apply one bet failure and return the new value
    pub fn reduce(&self) -> Duration {
        let mut current = self.current.lock();
        *current = current.saturating_sub(self.step).max(self.floor);
        *current
    }

    pub fn is_at_floor(&self) -> bool {
        self.current() == self.floor
    }
}
