//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    presenter::StageView,
    state::{Stage, StageConfig, TimerState},
};

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: StageView,
}

impl ApiResponse {
    /// Create a response describing the given timer state
    pub fn new(message: String, timer: TimerState) -> Self {
        let status = if timer.paused { "paused" } else { "running" };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: StageView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// One row of the stage table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
    pub stage: Stage,
    pub label: String,
    pub duration_seconds: u32,
    pub next: Stage,
}

impl From<&StageConfig> for StageInfo {
    fn from(config: &StageConfig) -> Self {
        Self {
            stage: config.stage,
            label: config.label.to_string(),
            duration_seconds: config.duration_seconds,
            next: config.stage.next(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
