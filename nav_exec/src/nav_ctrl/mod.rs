//! # Navigation control module
//!
//! `NavCtrl` is the single control-loop context of the navigation core. It owns the obstacle
//! model, the avoidance state machine, the planner and the motion queue, and runs them in a fixed
//! order once per cycle:
//!
//! 1. Apply any new navigation command (planning a path for a `Goto`),
//! 2. Step the avoidance state machine,
//! 3. Service a pending replan, retried whenever the obstacles or the robot's position change,
//! 4. Turn the executor's status into queue acknowledgements,
//! 5. Emit the commands for the executor.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use crate::{motion::QueueError, obstacle::ObstacleError};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("Failed to load NavCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Obstacle model error: {0}")]
    ObstacleError(#[from] ObstacleError),

    #[error("Motion queue error: {0}")]
    QueueError(#[from] QueueError),

    #[error("NavCtrl has not been initialised")]
    NotInitialised,
}
