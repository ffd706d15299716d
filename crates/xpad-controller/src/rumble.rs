use crate::clock::Ticks;

/// Last commanded motor magnitudes of a slot and when they stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RumbleState {
    low: u16,
    high: u16,
    expiry: Option<Ticks>,
}

impl RumbleState {
    pub fn magnitudes(&self) -> (u16, u16) {
        (self.low, self.high)
    }

    pub fn expiry(&self) -> Option<Ticks> {
        self.expiry
    }

    /// Whether a request for these magnitudes needs no new packet.
    pub fn is_current(&self, low: u16, high: u16) -> bool {
        self.low == low && self.high == high
    }

    /// Magnitudes the motors are running at, `(0, 0)` once expired.
    pub fn effective(&self, now: Ticks) -> (u16, u16) {
        match self.expiry {
            Some(deadline) if now.is_after(deadline) => (0, 0),
            _ => (self.low, self.high),
        }
    }

    /// Records magnitudes that were just sent to the device.
    pub fn commit(&mut self, low: u16, high: u16, now: Ticks, duration_ms: u32) {
        self.low = low;
        self.high = high;
        self.refresh(now, duration_ms);
    }

    /// Pushes the deadline out without re-sending anything.
    pub fn refresh(&mut self, now: Ticks, duration_ms: u32) {
        self.expiry = if self.low == 0 && self.high == 0 {
            None
        } else {
            Some(now.after_ms(duration_ms))
        };
    }

    /// Clears an elapsed command. Returns `true` exactly once per expiry,
    /// when the caller has to send a stop packet.
    pub fn expire(&mut self, now: Ticks) -> bool {
        match self.expiry {
            Some(deadline) if now.is_after(deadline) => {
                *self = RumbleState::default();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_until_duration_then_clears() {
        let mut state = RumbleState::default();
        state.commit(0x4000, 0x8000, Ticks(100), 500);

        assert_eq!(state.effective(Ticks(599)), (0x4000, 0x8000));
        assert!(!state.expire(Ticks(599)));
        assert_eq!(state.effective(Ticks(600)), (0x4000, 0x8000));

        assert_eq!(state.effective(Ticks(601)), (0, 0));
        assert!(state.expire(Ticks(601)));
        assert_eq!(state, RumbleState::default());
        assert!(!state.expire(Ticks(700)));
    }

    #[test]
    fn refresh_extends_deadline() {
        let mut state = RumbleState::default();
        state.commit(1, 1, Ticks(0), 100);
        state.refresh(Ticks(90), 100);
        assert_eq!(state.expiry(), Some(Ticks(190)));
        assert!(!state.expire(Ticks(150)));
    }

    #[test]
    fn zero_magnitudes_never_expire() {
        let mut state = RumbleState::default();
        state.commit(0, 0, Ticks(0), 100);
        assert_eq!(state.expiry(), None);
        assert!(!state.expire(Ticks(1_000)));
    }

    #[test]
    fn expiry_across_counter_rollover() {
        let mut state = RumbleState::default();
        state.commit(10, 20, Ticks(u32::MAX - 10), 100);
        assert_eq!(state.effective(Ticks(5)), (10, 20));
        assert!(!state.expire(Ticks(89)));
        assert!(state.expire(Ticks(90)));
    }
}
