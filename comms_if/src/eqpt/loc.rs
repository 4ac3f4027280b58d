//! # Localisation estimates
//!
//! Position estimates for the robot and the other robots on the playground.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pos::{Point, Pose};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of opposing robots on the playground.
pub const NUM_OPPONENTS: usize = 2;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Localisation estimates for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocEstimates {
    /// Pose of this robot
    pub own: Pose,

    /// Position of the teammate, if known
    #[serde(default)]
    pub teammate: Option<Point>,

    /// Positions of the opponents, if known
    #[serde(default)]
    pub opponents: [Option<Point>; NUM_OPPONENTS],
}
