//! Simulation parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::sensors::NUM_SENSORS, pos::Pose, wp::SpeedProfile};
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Pose of the robot at the start of the simulation
    pub initial_pose: Pose,

    // ---- EXECUTOR ----

    pub speed_fast_mm_s: f64,
    pub speed_normal_mm_s: f64,
    pub speed_slow_mm_s: f64,
    pub speed_very_slow_mm_s: f64,

    /// Rate at which the robot turns on the spot
    pub turn_rate_deg_s: f64,

    // ---- SENSORS ----

    /// Maximum distance at which a sensor sees another robot's centre
    pub sensor_range_mm: f64,

    /// Half width of each sensor's field of view
    pub sensor_half_cone_deg: f64,

    /// Direction each sensor looks in, relative to the robot's heading
    pub sensor_bearings_deg: [f64; NUM_SENSORS],

    // ---- LOCALISATION ----

    /// If true the simulated localisation reports the opponents' positions
    pub report_opponents: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimParams {
    pub fn speed_mm_s(&self, profile: SpeedProfile) -> f64 {
        match profile {
            SpeedProfile::Fast => self.speed_fast_mm_s,
            SpeedProfile::Normal => self.speed_normal_mm_s,
            SpeedProfile::Slow => self.speed_slow_mm_s,
            SpeedProfile::VerySlow => self.speed_very_slow_mm_s,
        }
    }
}
