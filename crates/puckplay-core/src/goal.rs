//! Goal-mouth geometry and the one-shot goal trigger

use crate::error::{Error, Result};
use crate::geometry::RinkPoint;
use serde::{Deserialize, Serialize};

/// Which net the puck entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalSide {
    Left,
    Right,
}

/// Goal-mouth bands in normalized rink units
///
/// The puck is in a net when it is past either goal line and between the
/// posts. The defaults fit the 200 x 85 rink: goal lines 11 ft from the end
/// boards and a 6 ft mouth centered on the rink's long axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalArea {
    /// Puck is in the left net when `x <= left_goal_line`
    pub left_goal_line: f64,
    /// Puck is in the right net when `x >= right_goal_line`
    pub right_goal_line: f64,
    /// Lower post
    pub mouth_bottom: f64,
    /// Upper post
    pub mouth_top: f64,
}

impl GoalArea {
    /// Which net, if any, contains `point`
    pub fn contains(&self, point: RinkPoint) -> Option<GoalSide> {
        if point.y < self.mouth_bottom || point.y > self.mouth_top {
            return None;
        }
        if point.x <= self.left_goal_line {
            Some(GoalSide::Left)
        } else if point.x >= self.right_goal_line {
            Some(GoalSide::Right)
        } else {
            None
        }
    }

    /// Reject inverted or non-finite bands
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.left_goal_line,
            self.right_goal_line,
            self.mouth_bottom,
            self.mouth_top,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("goal area values must be finite".into()));
        }
        if self.left_goal_line >= self.right_goal_line {
            return Err(Error::InvalidConfig(format!(
                "left goal line {} must be below right goal line {}",
                self.left_goal_line, self.right_goal_line
            )));
        }
        if self.mouth_bottom > self.mouth_top {
            return Err(Error::InvalidConfig(format!(
                "goal mouth bottom {} is above top {}",
                self.mouth_bottom, self.mouth_top
            )));
        }
        Ok(())
    }
}

impl Default for GoalArea {
    fn default() -> Self {
        Self {
            left_goal_line: 11.0,
            right_goal_line: 189.0,
            mouth_bottom: 39.5,
            mouth_top: 45.5,
        }
    }
}

/// One-shot trigger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GoalState {
    /// No goal detected since the last reset
    #[default]
    Pending,
    /// Goal detected at a frame
    Fired { frame_index: usize, side: GoalSide },
}

impl GoalState {
    /// Frame the goal fired at, if any
    pub fn fired_at_frame(&self) -> Option<usize> {
        match self {
            GoalState::Pending => None,
            GoalState::Fired { frame_index, .. } => Some(*frame_index),
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, GoalState::Fired { .. })
    }
}

/// Goal predicate plus its one-shot bookkeeping
///
/// # Example
///
/// ```
/// use puckplay_core::{GoalArea, GoalDetector, RinkPoint};
///
/// let mut detector = GoalDetector::new(GoalArea::default());
/// let in_net = RinkPoint::new(195.0, 42.5);
///
/// assert!(detector.evaluate(in_net, 7));
/// // Lingering in the net does not fire again
/// assert!(!detector.evaluate(in_net, 8));
/// assert_eq!(detector.state().fired_at_frame(), Some(7));
///
/// detector.reset();
/// assert!(detector.evaluate(in_net, 8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GoalDetector {
    area: GoalArea,
    state: GoalState,
}

impl GoalDetector {
    /// Create a detector for the given goal area
    pub fn new(area: GoalArea) -> Self {
        Self {
            area,
            state: GoalState::Pending,
        }
    }

    /// Returns true only on the first call whose point is inside a net
    pub fn evaluate(&mut self, point: RinkPoint, frame_index: usize) -> bool {
        if self.state.is_fired() {
            return false;
        }
        match self.area.contains(point) {
            Some(side) => {
                self.state = GoalState::Fired { frame_index, side };
                log::info!("goal detected at frame {} ({:?} net)", frame_index, side);
                true
            }
            None => false,
        }
    }

    /// Clear the trigger (restart or fresh load)
    pub fn reset(&mut self) {
        self.state = GoalState::Pending;
    }

    /// Current trigger state
    pub fn state(&self) -> GoalState {
        self.state
    }

    /// The configured goal area
    pub fn area(&self) -> &GoalArea {
        &self.area
    }
}
