//! State management module
//! 
//! This module contains the breathing stage table, the countdown state and
//! the shared application state.

pub mod stage;
pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use stage::{Stage, StageConfig, STAGES};
pub use app_state::AppState;
pub use timer_state::TimerState;
