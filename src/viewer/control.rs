use std::time::{Duration, Instant};

pub const PLAY_ALL_COOLDOWN: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    /// Disabled until the given instant.
    Cooldown { until: Instant },
}

/// The "Play All Animations" button's state machine.
///
/// Time is passed in by the caller so the cooldown can be driven by the
/// frame timer and by tests alike.
#[derive(Debug, Clone)]
pub struct PlayAllControl {
    state: ControlState,
    cooldown: Duration,
}

impl Default for PlayAllControl {
    fn default() -> Self {
        Self::new(PLAY_ALL_COOLDOWN)
    }
}

impl PlayAllControl {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: ControlState::Idle,
            cooldown,
        }
    }

    /// Current state, with an expired cooldown folded back to `Idle`.
    #[must_use]
    pub fn state(&self, now: Instant) -> ControlState {
        match self.state {
            ControlState::Cooldown { until } if now >= until => ControlState::Idle,
            state => state,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, now: Instant) -> bool {
        self.state(now) == ControlState::Idle
    }

    /// Attempts an activation. Returns `true` when the caller should
    /// dispatch; during the cooldown window the press is swallowed.
    pub fn activate(&mut self, now: Instant) -> bool {
        if !self.is_enabled(now) {
            log::debug!("Play-all ignored during cooldown");
            return false;
        }
        self.state = ControlState::Cooldown {
            until: now + self.cooldown,
        };
        true
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time left before the control re-enables.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state(now) {
            ControlState::Cooldown { until } => until.saturating_duration_since(now),
            ControlState::Idle => Duration::ZERO,
        }
    }
}
