//! Planner parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::wp::SpeedProfile;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannerParams {
    /// Maximum number of edges in the visibility graph
    #[serde(default = "default_max_edges")]
    pub max_edges: usize,

    /// Speed profile of the waypoints generated from a path
    pub speed: SpeedProfile,

    /// If true a report is saved into the session for every plan
    #[serde(default)]
    pub save_reports: bool,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_max_edges() -> usize {
    2048
}
