//! Breathing circle animation descriptors

use serde::{Deserialize, Serialize};

use crate::state::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Once,
    Forever,
}

/// How the breathing circle should scale while a stage is playing.
///
/// `keyframes` are scale factors; the last one is where the circle settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub keyframes: Vec<f32>,
    pub duration_seconds: f32,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl AnimationDescriptor {
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            // Slow pulse while waiting to start
            Stage::Prepare => Self {
                keyframes: vec![0.95, 1.05, 0.95],
                duration_seconds: 4.0,
                easing: Easing::EaseInOut,
                repeat: Repeat::Forever,
            },
            Stage::Inhale => Self::settle(1.2, Stage::Inhale.duration_seconds() as f32),
            Stage::Hold => Self::resting(),
            Stage::Exhale => Self::settle(0.8, Stage::Exhale.duration_seconds() as f32),
        }
    }

    /// Quick settle back to the natural size
    pub fn resting() -> Self {
        Self::settle(1.0, 0.5)
    }

    fn settle(scale: f32, duration_seconds: f32) -> Self {
        Self {
            keyframes: vec![scale],
            duration_seconds,
            easing: Easing::EaseInOut,
            repeat: Repeat::Once,
        }
    }

    pub fn target_scale(&self) -> f32 {
        self.keyframes.last().copied().unwrap_or(1.0)
    }
}
