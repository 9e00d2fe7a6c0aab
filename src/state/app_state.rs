//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::TimerState;
use crate::tasks::{StageTimer, StageTimerHandle, TimerAction};

/// Shared state behind the HTTP layer
#[derive(Debug)]
pub struct AppState {
    /// Handle to the stage timer task
    pub timer: StageTimerHandle,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState and spawn its stage timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(port: u16, host: String, start_running: bool) -> Self {
        let initial = if start_running {
            TimerState::running()
        } else {
            TimerState::new()
        };

        Self {
            timer: StageTimer::spawn(initial),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward a user command to the timer and record it as the last action
    pub async fn apply(&self, action: TimerAction) -> Result<TimerState, String> {
        info!("{} requested", action.as_str());
        let state = self.timer.send(action).await?;
        self.record_action(action.as_str());
        Ok(state)
    }

    pub async fn resume(&self) -> Result<TimerState, String> {
        self.apply(TimerAction::Resume).await
    }

    pub async fn pause(&self) -> Result<TimerState, String> {
        self.apply(TimerAction::Pause).await
    }

    pub async fn toggle(&self) -> Result<TimerState, String> {
        self.apply(TimerAction::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerState, String> {
        self.apply(TimerAction::Reset).await
    }

    /// Get current timer state, applying any tick that is already due
    pub async fn get_timer_state(&self) -> Result<TimerState, String> {
        self.timer.snapshot().await
    }

    /// Receiver holding the latest timer state
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.timer.subscribe()
    }

    /// Receiver that gets every timer state change in order
    pub fn changes(&self) -> broadcast::Receiver<TimerState> {
        self.timer.changes()
    }

    /// Stop the stage timer task
    pub async fn teardown(&self) {
        match self.timer.shutdown().await {
            Ok(state) => info!("Stage timer stopped at {} ({}s)", state.stage, state.remaining),
            Err(e) => warn!("Stage timer already stopped: {}", e),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
