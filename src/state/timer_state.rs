//! Timer state structure and its transitions

use serde::{Deserialize, Serialize};

use super::Stage;

/// Countdown state for the breathing cycle.
///
/// While running, `remaining` stays within `1..=stage.duration_seconds()`:
/// the step that would reach zero moves to the next stage instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub stage: Stage,
    pub remaining: u32,
    pub paused: bool,
}

impl TimerState {
    /// Create a stopped timer at the start of the cycle
    pub fn new() -> Self {
        Self {
            stage: Stage::Prepare,
            remaining: Stage::Prepare.duration_seconds(),
            paused: true,
        }
    }

    /// Create a running timer at the start of the cycle
    pub fn running() -> Self {
        Self {
            paused: false,
            ..Self::new()
        }
    }

    /// Same state with `remaining` pulled into `1..=stage.duration_seconds()`
    pub fn clamped(self) -> Self {
        Self {
            remaining: self.remaining.clamp(1, self.stage.duration_seconds()),
            ..self
        }
    }

    pub fn is_running(&self) -> bool {
        !self.paused
    }

    /// Advance the countdown by one second.
    ///
    /// Returns true when the step moved to a new stage.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 1 {
            self.remaining -= 1;
            false
        } else {
            self.stage = self.stage.next();
            self.remaining = self.stage.duration_seconds();
            true
        }
    }

    /// Returns true if the state changed
    pub fn pause(&mut self) -> bool {
        let changed = !self.paused;
        self.paused = true;
        changed
    }

    /// Returns true if the state changed
    pub fn resume(&mut self) -> bool {
        let changed = self.paused;
        self.paused = false;
        changed
    }

    /// Return to a stopped timer at the start of the cycle
    pub fn reset(&mut self) -> bool {
        let fresh = Self::new();
        let changed = *self != fresh;
        *self = fresh;
        changed
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
