//! Background tasks module
//! 
//! This module contains the stage timer task that drives the breathing cycle.

pub mod stage_timer;

// Re-export main types
pub use stage_timer::{StageTimer, StageTimerHandle, TimerAction, TimerCommand, TICK_INTERVAL};
