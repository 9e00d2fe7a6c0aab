//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    presenter::StageView,
    state::{AppState, TimerState, STAGES},
    tasks::TimerAction,
};
use super::responses::{ApiResponse, HealthResponse, StageInfo, StatusResponse};

/// Apply a command and wrap the resulting state in an [`ApiResponse`]
async fn command_response(
    state: &AppState,
    action: TimerAction,
    describe: fn(&TimerState) -> String,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.apply(action).await {
        Ok(timer) => {
            info!("{} endpoint called - {} {}s, paused={}",
                  action.as_str(), timer.stage, timer.remaining, timer.paused);
            Ok(Json(ApiResponse::new(describe(&timer), timer)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action.as_str(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn describe_running(timer: &TimerState) -> String {
    if timer.paused {
        format!("Paused during {}", timer.stage.label())
    } else {
        format!("Breathing: {}", timer.stage.label())
    }
}

/// Handle POST /resume - Start or continue the countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(&state, TimerAction::Resume, describe_running).await
}

/// Handle POST /pause - Freeze the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(&state, TimerAction::Pause, describe_running).await
}

/// Handle POST /toggle - Pause when running, resume when paused
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(&state, TimerAction::Toggle, describe_running).await
}

/// Handle POST /reset - Back to the start of the cycle, paused
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(&state, TimerAction::Reset, |_| "Timer reset".to_string()).await
}

/// Handle GET /status - Return current timer view and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer_state().await {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: timer.into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /stages - Return the fixed stage table
pub async fn stages_handler() -> Json<Vec<StageInfo>> {
    Json(STAGES.iter().map(StageInfo::from).collect())
}

/// Handle GET /events - Stream the current view, then one event per change
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Events subscriber connected");
    // Subscribe before reading the current state so no change falls in between
    let changes = state.changes();
    let current = StageView::from(state.timer.current());

    let updates = stream::unfold(changes, |mut changes| async move {
        loop {
            match changes.recv().await {
                Ok(timer) => {
                    let event = state_event(&StageView::from(timer));
                    return Some((Ok::<_, Infallible>(event), changes));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Events subscriber lagged, skipped {} state changes", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("Stage timer stopped, closing event stream");
                    return None;
                }
            }
        }
    });

    let events = stream::once(async move { Ok::<_, Infallible>(state_event(&current)) }).chain(updates);

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn state_event(view: &StageView) -> Event {
    match Event::default().event("state").json_data(view) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to encode state event: {}", e);
            Event::default().event("error").data("encoding failed")
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
