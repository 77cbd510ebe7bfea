//! Staged progress reporting for the response stream.
//!
//! Generation advances through named stages; a tracker snapshot can be
//! interleaved into the outbound stream at any point. Failing to deliver
//! a progress message is never fatal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle of one pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageState {
    Waiting,
    Running,
    Done,
}

/// One named step of the generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    pub state: StageState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl Stage {
    pub fn waiting(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            state: StageState::Waiting,
            duration: None,
        }
    }

    pub fn running(title: impl Into<String>) -> Self {
        Self {
            state: StageState::Running,
            ..Self::waiting(title)
        }
    }
}

/// Overall pipeline progress: ordered stages plus a completion fraction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub stages: Vec<Stage>,
    pub percentage: f64,
}

/// Mutable progress state for one generation run.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    progress: Progress,
}

impl ProgressTracker {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            progress: Progress {
                stages,
                percentage: 0.0,
            },
        }
    }

    pub fn set_percentage(&mut self, percentage: f64) {
        self.progress.percentage = percentage;
    }

    /// Mark every stage done with the given elapsed duration.
    pub fn complete_all(&mut self, elapsed: Duration) {
        for stage in &mut self.progress.stages {
            stage.state = StageState::Done;
            stage.duration = Some(elapsed);
        }
    }

    /// Current snapshot, as embedded in a response message.
    pub fn snapshot(&self) -> Progress {
        self.progress.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_lifecycle() {
        let mut tracker = ProgressTracker::new(vec![
            Stage::running("Prepare grid"),
            Stage::waiting("Process tiles"),
        ]);
        let first = tracker.snapshot();
        assert_eq!(first.percentage, 0.0);
        assert_eq!(first.stages[0].state, StageState::Running);
        assert_eq!(first.stages[1].state, StageState::Waiting);
        assert!(first.stages[0].duration.is_none());

        tracker.complete_all(Duration::from_millis(125));
        tracker.set_percentage(1.0);
        let done = tracker.snapshot();
        assert_eq!(done.percentage, 1.0);
        for stage in &done.stages {
            assert_eq!(stage.state, StageState::Done);
            assert_eq!(stage.duration, Some(Duration::from_millis(125)));
        }
    }

    #[test]
    fn test_stage_state_serializes_screaming() {
        let json = serde_json::to_string(&StageState::Running).unwrap();
        assert_eq!(json, r#""RUNNING""#);
    }
}
