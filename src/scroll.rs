//! Scroll input → workspace switches.
//!
//! Wheel clicks arrive as discrete [`ScrollInput::Up`] / [`ScrollInput::Down`]
//! events; touchpads deliver a stream of small [`ScrollInput::Smooth`]
//! deltas.  Smooth deltas are accumulated and converted into whole steps
//! once they cross [`SMOOTH_SCROLL_THRESHOLD`], with the remainder carried
//! forward so a slow gesture never drifts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accumulated smooth-scroll distance that equals one workspace step.
pub const SMOOTH_SCROLL_THRESHOLD: f64 = 0.8;

/// One scroll event from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    Up,
    Down,
    /// Continuous scrolling.  Positive `delta_y` scrolls down.
    Smooth { delta_y: f64 },
}

impl fmt::Display for ScrollInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollInput::Up => write!(f, "up"),
            ScrollInput::Down => write!(f, "down"),
            ScrollInput::Smooth { delta_y } => write!(f, "smooth({:.2})", delta_y),
        }
    }
}

/// What happens when a step would leave `[0, total)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPolicy {
    /// The step is dropped.
    #[default]
    Clamp,
    /// The index wraps around modulo the workspace count.
    Wrap,
}

/// Request to activate a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCommand {
    pub index: usize,
}

/// Converts scroll input into [`SwitchCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct ScrollNavigator {
    policy: ScrollPolicy,
    accumulator: f64,
}

impl ScrollNavigator {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self {
            policy,
            accumulator: 0.0,
        }
    }

    pub fn policy(&self) -> ScrollPolicy {
        self.policy
    }

    /// Smooth distance carried over from previous events.
    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Feed one scroll event.
    ///
    /// `active` and `total` describe the host's current state.  Returns the
    /// workspace to activate, or `None` when the event was consumed without
    /// a switch (below threshold, or blocked at a boundary under
    /// [`ScrollPolicy::Clamp`]).
    pub fn on_scroll(&mut self, input: ScrollInput, active: usize, total: usize) -> Option<SwitchCommand> {
        let steps = match input {
            ScrollInput::Up => {
                self.accumulator = 0.0;
                -1
            }
            ScrollInput::Down => {
                self.accumulator = 0.0;
                1
            }
            ScrollInput::Smooth { delta_y } => {
                if delta_y == 0.0 || !delta_y.is_finite() {
                    return None;
                }
                let total_delta = self.accumulator + delta_y;
                // Remainder keeps the sign of the delta and stays below one step.
                self.accumulator = total_delta % SMOOTH_SCROLL_THRESHOLD;
                // Saturates for deltas beyond the i64 range.
                ((total_delta - self.accumulator) / SMOOTH_SCROLL_THRESHOLD).round() as i64
            }
        };

        if steps == 0 {
            return None;
        }
        let target = self.apply_steps(active, total, steps)?;
        (target != active).then_some(SwitchCommand { index: target })
    }

    /// Move `steps` from `active`.  Clamp stops at the boundary instead of
    /// rejecting the whole gesture; Wrap goes around modulo `total`.
    fn apply_steps(&self, active: usize, total: usize, steps: i64) -> Option<usize> {
        if total == 0 {
            return None;
        }
        let total = total as i64;
        let active = (active as i64).min(total - 1);
        let index = match self.policy {
            ScrollPolicy::Clamp => active.saturating_add(steps).clamp(0, total - 1),
            ScrollPolicy::Wrap => (active + steps.rem_euclid(total)).rem_euclid(total),
        };
        Some(index as usize)
    }
}
