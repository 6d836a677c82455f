//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Time is expressed as an offset from a fixed origin, so scenarios can be
/// written in the same "t = 0, t = 10, t = 20" terms they are reasoned in.
/// Clones share the same time value.
///
/// ```ignore
/// use request_throttle::infrastructure::mocks::MockClock;
/// use request_throttle::Clock;
/// use std::time::Duration;
///
/// let clock = MockClock::starting_now();
/// clock.set_secs(20);
/// assert_eq!(clock.now(), clock.at_secs(20));
///
/// clock.advance(Duration::from_secs(41));
/// assert_eq!(clock.now(), clock.at_secs(61));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock whose origin is `origin`, currently at the origin.
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Create a mock clock whose origin is the real current instant.
    pub fn starting_now() -> Self {
        Self::new(Instant::now())
    }

    /// The instant `secs` seconds after the origin.
    pub fn at_secs(&self, secs: u64) -> Instant {
        self.origin + Duration::from_secs(secs)
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut offset = self
            .offset
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *offset += duration;
    }

    /// Move the clock to `secs` seconds after the origin, backwards included.
    pub fn set_secs(&self, secs: u64) {
        let mut offset = self
            .offset
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *offset = Duration::from_secs(secs);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let offset = self
            .offset
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        self.origin + *offset
    }
}
