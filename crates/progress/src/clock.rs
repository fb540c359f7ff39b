use std::time::Duration;

/// Turns elapsed wall time into whole play-time seconds.
///
/// Time only accrues while the clock is active; a single advance is clamped to
/// `max_step` so a suspended host does not come back with hours of play time.
#[derive(Debug, Clone)]
pub struct PlayClock {
    active: bool,
    carry: Duration,
    max_step: Duration,
}

impl PlayClock {
    pub const TICK: Duration = Duration::from_secs(1);

    pub fn new(max_step: Duration) -> Self {
        Self {
            active: true,
            carry: Duration::ZERO,
            max_step: normalize_max_step(max_step),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.carry = Duration::ZERO;
        }
        self.active = active;
    }

    /// Returns the number of whole seconds that elapsed since the last call.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        if !self.active {
            return 0;
        }
        self.carry = self.carry.saturating_add(elapsed.min(self.max_step));
        let seconds = self.carry.as_secs();
        self.carry -= Duration::from_secs(seconds);
        seconds
    }
}

impl Default for PlayClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

fn normalize_max_step(max_step: Duration) -> Duration {
    if max_step < PlayClock::TICK {
        PlayClock::TICK
    } else {
        max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_carry_over_between_advances() {
        let mut clock = PlayClock::default();

        assert_eq!(clock.advance(Duration::from_millis(600)), 0);
        assert_eq!(clock.advance(Duration::from_millis(600)), 1);
        assert_eq!(clock.advance(Duration::from_millis(800)), 1);
    }

    #[test]
    fn inactive_clock_discards_time() {
        let mut clock = PlayClock::default();
        clock.advance(Duration::from_millis(900));
        clock.set_active(false);

        assert_eq!(clock.advance(Duration::from_secs(3)), 0);
        clock.set_active(true);
        assert_eq!(clock.advance(Duration::from_millis(200)), 0);
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut clock = PlayClock::new(Duration::from_secs(2));
        assert_eq!(clock.advance(Duration::from_secs(3600)), 2);
    }

    #[test]
    fn zero_max_step_is_raised_to_one_tick() {
        let mut clock = PlayClock::new(Duration::ZERO);
        assert_eq!(clock.advance(Duration::from_secs(10)), 1);
    }
}
