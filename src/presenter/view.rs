//! Display values derived from a timer snapshot

use serde::{Deserialize, Serialize};

use super::AnimationDescriptor;
use crate::state::{Stage, TimerState};

pub const HEADING: &str = "4-7-8 Breathing Method";
pub const HINT: &str = "Just follow the prompts, try to clear your mind.";

/// Everything a renderer needs to draw the current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageView {
    pub stage: Stage,
    pub label: String,
    pub remaining: u32,
    pub paused: bool,
    /// Background color key for the stage
    pub theme: String,
    pub heading: Option<String>,
    pub hint: Option<String>,
    /// Stage animation while running, a settle back to rest on a freshly
    /// reset timer, `None` while paused mid-cycle (the circle stays put)
    pub animation: Option<AnimationDescriptor>,
}

pub fn theme_for(stage: Stage) -> &'static str {
    match stage {
        Stage::Prepare => "blue",
        Stage::Inhale => "green",
        Stage::Hold => "yellow",
        Stage::Exhale => "purple",
    }
}

fn animation_for(state: TimerState) -> Option<AnimationDescriptor> {
    if state.is_running() {
        Some(AnimationDescriptor::for_stage(state.stage))
    } else if state == TimerState::new() {
        Some(AnimationDescriptor::resting())
    } else {
        None
    }
}

impl From<TimerState> for StageView {
    fn from(state: TimerState) -> Self {
        let TimerState { stage, remaining, paused } = state;

        Self {
            stage,
            label: stage.label().to_string(),
            remaining,
            paused,
            theme: theme_for(stage).to_string(),
            heading: paused.then(|| HEADING.to_string()),
            hint: (paused && stage == Stage::Prepare).then(|| HINT.to_string()),
            animation: animation_for(state),
        }
    }
}
