//! # Trajectory executor interface
//!
//! The trajectory executor is the downstream consumer of waypoints. It is treated as opaque: it
//! receives commands and reports its status once per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::wp::Waypoint;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Status reported by the executor each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorStatus {
    /// No waypoint is being executed.
    Idle,

    /// The current waypoint is being executed.
    Busy,

    /// The executor cannot make progress on the current waypoint (e.g. wheel slip, stall).
    Blocked,

    /// The current waypoint has been reached. Reported for a single cycle.
    Finished,
}

/// Commands sent to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutorCmd {
    /// Start executing the given waypoint.
    Execute(Waypoint),

    /// Stop moving, keeping the current waypoint.
    Pause,

    /// Continue with the current waypoint.
    Resume,

    /// Stop moving and drop the current waypoint.
    Abort,
}

impl Default for ExecutorStatus {
    fn default() -> Self {
        ExecutorStatus::Idle
    }
}
