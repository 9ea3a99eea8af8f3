// ABOUTME: Steps of a switch and the ephemeral record of one switch attempt.
// ABOUTME: Used for logging, JSON output, hook context, and exit-code decisions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::types::Color;

/// A step of the switch state machine that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchStep {
    ComputeTarget,
    StopOld,
    StartNew,
    AwaitHealthy,
    AwaitReachable,
    UpdateRouting,
    Persist,
}

impl SwitchStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchStep::ComputeTarget => "COMPUTE_TARGET",
            SwitchStep::StopOld => "STOP_OLD",
            SwitchStep::StartNew => "START_NEW",
            SwitchStep::AwaitHealthy => "AWAIT_HEALTHY",
            SwitchStep::AwaitReachable => "AWAIT_REACHABLE",
            SwitchStep::UpdateRouting => "UPDATE_ROUTING",
            SwitchStep::Persist => "PERSIST",
        }
    }
}

impl fmt::Display for SwitchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "step", rename_all = "snake_case")]
pub enum SwitchOutcome {
    InProgress,
    Done,
    Failed(SwitchStep),
}

/// One switch attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchOperation {
    /// Live color before the switch; None on bootstrap.
    pub from: Option<Color>,
    pub to: Color,
    pub started_at: DateTime<Utc>,
    pub outcome: SwitchOutcome,
}

impl SwitchOperation {
    pub fn is_bootstrap(&self) -> bool {
        self.from.is_none()
    }

    pub fn elapsed_secs(&self) -> f64 {
        (Utc::now() - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    pub(crate) fn with_outcome(mut self, outcome: SwitchOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl fmt::Display for SwitchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "{} -> {}", from, self.to),
            None => write!(f, "(bootstrap) -> {}", self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_display_as_state_names() {
        assert_eq!(SwitchStep::AwaitHealthy.to_string(), "AWAIT_HEALTHY");
        assert_eq!(SwitchStep::UpdateRouting.to_string(), "UPDATE_ROUTING");
    }

    #[test]
    fn outcome_serializes_with_step() {
        let json = serde_json::to_string(&SwitchOutcome::Failed(SwitchStep::StartNew)).unwrap();
        assert_eq!(json, r#"{"status":"failed","step":"START_NEW"}"#);
        let json = serde_json::to_string(&SwitchOutcome::Done).unwrap();
        assert_eq!(json, r#"{"status":"done"}"#);
    }

    #[test]
    fn display_marks_bootstrap() {
        let op = SwitchOperation {
            from: None,
            to: Color::Green,
            started_at: Utc::now(),
            outcome: SwitchOutcome::InProgress,
        };
        assert!(op.is_bootstrap());
        assert_eq!(op.to_string(), "(bootstrap) -> green");
    }
}
