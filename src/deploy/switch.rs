// ABOUTME: Generic switch struct parameterized by state marker.
// ABOUTME: Carries the from/to colors and start time through every transition.

use chrono::{DateTime, Utc};

use super::operation::{SwitchOperation, SwitchOutcome};
use super::state::Planned;
use crate::types::Color;

/// A switch in progress, parameterized by its current state.
///
/// Transitions consume the switch and return it in the next state, so a
/// step can only run once the steps before it have succeeded.
#[derive(Debug)]
pub struct Switch<S> {
    pub(crate) from: Option<Color>,
    pub(crate) to: Color,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) state: S,
}

impl Switch<Planned> {
    /// COMPUTE_TARGET: toggle the active color, or bootstrap to `default`.
    pub fn plan(active: Option<Color>, default: Color) -> Self {
        let to = match active {
            Some(color) => color.other(),
            None => default,
        };
        Switch {
            from: active,
            to,
            started_at: Utc::now(),
            state: Planned,
        }
    }
}

impl<S> Switch<S> {
    /// Live color before this switch (None on bootstrap).
    pub fn from(&self) -> Option<Color> {
        self.from
    }

    /// Color this switch makes live.
    pub fn to(&self) -> Color {
        self.to
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Snapshot of this switch as an in-progress operation record.
    pub fn operation(&self) -> SwitchOperation {
        SwitchOperation {
            from: self.from,
            to: self.to,
            started_at: self.started_at,
            outcome: SwitchOutcome::InProgress,
        }
    }

    pub(crate) fn transition<T>(self, state: T) -> Switch<T> {
        Switch {
            from: self.from,
            to: self.to,
            started_at: self.started_at,
            state,
        }
    }
}
