//! Breathe Timer - A guided 4-7-8 breathing timer
//! 
//! This library provides the breathing stage state machine, the task that
//! drives it once per second, and an HTTP surface for controlling and
//! observing it.

pub mod config;
pub mod state;
pub mod tasks;
pub mod presenter;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Stage, TimerState};
pub use tasks::{StageTimer, StageTimerHandle};
pub use presenter::{AnimationDescriptor, StageView};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
