//! Obstacle model parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::geom::Point;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sizes and parking position of the dynamic obstacles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DynamicParams {
    /// Half the side of the square drawn around the teammate
    pub teammate_half_size_mm: i32,

    /// Half the side of the square drawn around an opponent
    pub opponent_half_size_mm: i32,

    /// Centre of the squares of parked dynamic obstacles. Must be outside the playground.
    pub park_position: Point,

    /// Minimum gap between the robot's centre and the side of a dynamic obstacle. Obstacles
    /// estimated closer than this are pushed away from the robot, so that the robot never plans
    /// from inside one.
    #[serde(default = "default_own_clearance_mm")]
    pub own_clearance_mm: i32,
}

/// The static obstacles of the playground, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticObstacles {
    #[serde(default)]
    pub polygons: Vec<StaticPolygon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPolygon {
    /// Human readable name used in logs
    #[serde(default)]
    pub name: String,

    pub points: Vec<Point>,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_own_clearance_mm() -> i32 {
    50
}
