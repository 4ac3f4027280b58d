//! # Navigation Executable Parameters
//!
//! This module provide parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::sim::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NavExecParams {
    /// Target period of one cycle
    pub cycle_period_s: f64,

    /// If true the cycle is padded with a sleep to run in real time, otherwise the simulation
    /// runs as fast as possible
    pub real_time: bool,

    /// Number of cycles between two status reports in the log
    pub status_period_cycles: u64,

    /// Maximum number of consecutive cycle overruns before the run is abandoned
    pub max_consec_cycle_overruns: u64,

    /// Maximum number of consecutive NavCtrl processing errors before the run is abandoned
    pub max_consec_nav_ctrl_errors: u64,

    pub sim: SimParams,
}
