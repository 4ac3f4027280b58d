//! # Navigation library.
//!
//! This library holds the navigation core and allows other crates in the workspace (and the
//! benchmarks) to access items defined inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Avoidance state machine - reacts to proximity sensor detections
pub mod avoid;

/// Global data store for the executable
pub mod data_store;

/// Integer geometry primitives
pub mod geom;

/// Waypoint motion queue - feeds waypoints to the trajectory executor
pub mod motion;

/// Navigation control - the control-loop context owning the navigation core
pub mod nav_ctrl;

/// Obstacle model - static and dynamic polygons on the playground
pub mod obstacle;

/// Parameters for the executable
pub mod params;

/// Path planner - visibility graph and shortest path
pub mod plan;

/// Shared sensor snapshot
pub mod sensors;

/// Simulated world used by the executable
pub mod sim;
