use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Millisecond timestamp from a wrapping 32-bit monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ticks(pub u32);

/// Distances at or beyond this are read as "behind" rather than "ahead".
const HALF_RANGE: u32 = 1 << 31;

impl Ticks {
    #[inline]
    pub const fn after_ms(self, ms: u32) -> Ticks {
        Ticks(self.0.wrapping_add(ms))
    }

    /// Whether `self` lies strictly after `deadline`, correct across counter
    /// rollover as long as both are within half the range of each other.
    #[inline]
    pub const fn is_after(self, deadline: Ticks) -> bool {
        let distance = self.0.wrapping_sub(deadline.0);
        distance != 0 && distance < HALF_RANGE
    }
}

/// Source of monotonic time for rumble expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Ticks;
}

/// Milliseconds since the clock was created, truncated to 32 bits.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Ticks {
        Ticks(self.origin.elapsed().as_millis() as u32)
    }
}

/// Clock moved by hand, for replays and tests.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU32);

impl ManualClock {
    pub fn new(start: Ticks) -> Self {
        Self(AtomicU32::new(start.0))
    }

    pub fn set(&self, ticks: Ticks) {
        self.0.store(ticks.0, Ordering::Release);
    }

    pub fn advance(&self, ms: u32) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some(t.wrapping_add(ms)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        Ticks(self.0.load(Ordering::Acquire))
    }
}
