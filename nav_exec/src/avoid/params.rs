//! Avoidance parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::sensors::NUM_SENSORS;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvoidParams {
    /// Time a sensor must stay active before a detection is confirmed
    pub debounce_ms: u32,

    /// Time the robot stays stopped after a confirmed detection
    pub stop_ms: u32,

    /// Time the sensors that triggered a detection are ignored once rerouting
    pub ignore_ms: u32,

    /// Time a recorded opponent position remains usable by the planner
    pub opponent_validity_ms: u32,

    /// Distance from the robot's centre at which a sensor detects an obstacle
    pub detection_distance_mm: i32,

    /// Direction each sensor looks in, relative to the robot's heading, in `Sensor::ALL` order
    pub sensor_bearings_deg: [i32; NUM_SENSORS],
}
