//! # Playground positions
//!
//! All positions are expressed in the playground frame, in whole millimetres, with the origin at
//! one corner of the playground, X along the long side and Y along the short side. Angles are in
//! whole degrees, counter-clockwise from +X.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point on the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in millimetres
    pub x: i32,

    /// Y coordinate in millimetres
    pub y: i32,
}

/// A point of interest: a point with an optional orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Poi {
    /// X coordinate in millimetres
    pub x: i32,

    /// Y coordinate in millimetres
    pub y: i32,

    /// Orientation in degrees, `None` if the orientation doesn't matter
    pub a: Option<i32>,
}

/// The pose of a robot: its position and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the centre of the robot
    pub position: Point,

    /// Heading of the robot's front in degrees
    pub heading_deg: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Poi {
    pub const fn new(x: i32, y: i32, a: Option<i32>) -> Self {
        Self { x, y, a }
    }

    /// The position of the POI, dropping the orientation.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Poi {
    fn from(p: Point) -> Self {
        Poi::new(p.x, p.y, None)
    }
}

impl Pose {
    pub const fn new(x: i32, y: i32, heading_deg: i32) -> Self {
        Self {
            position: Point::new(x, y),
            heading_deg,
        }
    }
}
