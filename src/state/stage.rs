//! Breathing stages and their fixed configuration table

use serde::{Deserialize, Serialize};

/// One phase of the breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Prepare,
    Inhale,
    Hold,
    Exhale,
}

/// Immutable per-stage settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageConfig {
    pub stage: Stage,
    pub label: &'static str,
    pub duration_seconds: u32,
}

/// Stage table in cycle order. Durations follow the 4-7-8 relaxation technique
/// with a short lead-in.
pub static STAGES: [StageConfig; 4] = [
    StageConfig { stage: Stage::Prepare, label: "Get Ready", duration_seconds: 5 },
    StageConfig { stage: Stage::Inhale, label: "Inhale", duration_seconds: 4 },
    StageConfig { stage: Stage::Hold, label: "Hold", duration_seconds: 7 },
    StageConfig { stage: Stage::Exhale, label: "Exhale", duration_seconds: 8 },
];

impl Stage {
    /// Stage that follows this one in the cycle
    pub fn next(self) -> Self {
        match self {
            Stage::Prepare => Stage::Inhale,
            Stage::Inhale => Stage::Hold,
            Stage::Hold => Stage::Exhale,
            Stage::Exhale => Stage::Prepare,
        }
    }

    pub fn config(self) -> &'static StageConfig {
        &STAGES[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.config().label
    }

    pub fn duration_seconds(self) -> u32 {
        self.config().duration_seconds
    }

    /// Lowercase identifier, matching the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Inhale => "inhale",
            Stage::Hold => "hold",
            Stage::Exhale => "exhale",
        }
    }

    fn index(self) -> usize {
        match self {
            Stage::Prepare => 0,
            Stage::Inhale => 1,
            Stage::Hold => 2,
            Stage::Exhale => 3,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_cycle_order() {
        for (i, config) in STAGES.iter().enumerate() {
            assert_eq!(config.stage.config(), config);
            assert_eq!(STAGES[(i + 1) % STAGES.len()].stage, config.stage.next());
        }
    }

    #[test]
    fn four_steps_close_the_cycle() {
        for config in &STAGES {
            let stage = config.stage;
            assert_eq!(stage.next().next().next().next(), stage);
            assert_ne!(stage.next(), stage);
        }
    }

    #[test]
    fn durations_and_labels() {
        assert_eq!(Stage::Prepare.duration_seconds(), 5);
        assert_eq!(Stage::Inhale.duration_seconds(), 4);
        assert_eq!(Stage::Hold.duration_seconds(), 7);
        assert_eq!(Stage::Exhale.duration_seconds(), 8);
        assert_eq!(Stage::Prepare.label(), "Get Ready");
        assert_eq!(Stage::Exhale.label(), "Exhale");
        assert!(STAGES.iter().all(|c| c.duration_seconds > 0));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Hold).unwrap(), "\"hold\"");
        let stage: Stage = serde_json::from_str("\"inhale\"").unwrap();
        assert_eq!(stage, Stage::Inhale);
        assert_eq!(Stage::Prepare.to_string(), "prepare");
    }
}
