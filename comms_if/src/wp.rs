//! # Waypoints
//!
//! A waypoint is a single motion directive sent to the trajectory executor.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pos::Point;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The kind of motion the executor must perform to reach a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionType {
    /// Nothing to do, the waypoint only acts as a synchronisation point.
    NoMotion,

    /// Go to the target, the executor picks forwards or backwards motion.
    GotoAuto,

    /// Go to the target driving forwards.
    GotoForward,

    /// Go to the target driving backwards.
    GotoBackward,

    /// Move by a relative distance and angle from the current pose.
    MoveRelative,

    /// Turn on the spot so that the front faces the target.
    OrientFront,

    /// Turn on the spot so that the back faces the target.
    OrientBehind,
}

/// Speed profile used by the executor for a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedProfile {
    Fast,
    Normal,
    Slow,
    VerySlow,
}

/// Where a waypoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WpTarget {
    /// An absolute point on the playground.
    Absolute(Point),

    /// A displacement relative to the robot's pose when the waypoint starts executing.
    Relative {
        /// Distance to travel in millimetres, negative values move backwards.
        dist_mm: i32,

        /// Rotation to apply before travelling, in degrees.
        angle_deg: i32,
    },
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single motion directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub motion: MotionType,

    /// Offset of the controlled point from the robot's centre, in the robot frame. A zero offset
    /// drives the centre of the robot onto the target.
    pub offset: Point,

    pub target: WpTarget,

    pub speed: SpeedProfile,

    /// If true the executor must come to a stop on this waypoint, otherwise it may blend into the
    /// next one.
    pub must_finish: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SpeedProfile {
    fn default() -> Self {
        SpeedProfile::Normal
    }
}

impl Waypoint {
    /// A `GotoAuto` waypoint to the given absolute point, with no offset.
    pub fn goto(target: Point, speed: SpeedProfile, must_finish: bool) -> Self {
        Self {
            motion: MotionType::GotoAuto,
            offset: Point::default(),
            target: WpTarget::Absolute(target),
            speed,
            must_finish,
        }
    }

    /// The absolute target of this waypoint, if it has one.
    pub fn target_point(&self) -> Option<Point> {
        match self.target {
            WpTarget::Absolute(p) => Some(p),
            WpTarget::Relative { .. } => None,
        }
    }
}
