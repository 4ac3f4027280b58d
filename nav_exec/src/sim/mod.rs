//! # Simulation
//!
//! A simple simulated world for running the navigation core on a host: a kinematic executor, the
//! other robots, the proximity sensors and the localisation. The world is driven by timed
//! [`SimEvent`]s read from a scenario script.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod executor;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::{
        loc::{LocEstimates, NUM_OPPONENTS},
        sensors::{Sensor, SensorSet},
    },
    pos::Point,
    tc::NavCmd,
};
use log::{info, warn};
use nalgebra::Point2;
use serde::Deserialize;
use util::maths::wrap_pi;

pub use executor::SimExecutor;
pub use params::SimParams;

use crate::sensors::SharedSensors;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimWorld {
    params: SimParams,

    pub executor: SimExecutor,

    /// True positions of the other robots
    teammate: Option<Point>,
    opponents: [Option<Point>; NUM_OPPONENTS],

    /// Sensor flags forced on by the script, on top of the modelled ones
    forced_sensors: SensorSet,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event in a scenario script.
#[derive(Debug, Clone, Deserialize)]
pub enum SimEvent {
    /// A command for the navigation core.
    Nav(NavCmd),

    /// Force sensor flags on, regardless of the robots around.
    Sensors(SensorSet),

    /// Set the external sensor mask.
    SensorMask(SensorSet),

    /// Place or remove the teammate.
    Teammate(Option<Point>),

    /// Place or remove an opponent.
    Opponent {
        index: usize,
        position: Option<Point>,
    },

    /// Make the executor report that it is blocked.
    Blocked(bool),

    /// A note, written to the log.
    Note(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimParams) -> Self {
        Self {
            executor: SimExecutor::new(params.clone()),
            params,
            teammate: None,
            opponents: [None; NUM_OPPONENTS],
            forced_sensors: SensorSet::EMPTY,
        }
    }

    /// Apply a scripted event. Navigation commands are returned for the caller to pass on.
    pub fn apply(&mut self, event: SimEvent, sensors: &SharedSensors) -> Option<NavCmd> {
        match event {
            SimEvent::Nav(cmd) => return Some(cmd),
            SimEvent::Sensors(set) => self.forced_sensors = set,
            SimEvent::SensorMask(mask) => sensors.set_mask(mask),
            SimEvent::Teammate(pos) => self.teammate = pos,
            SimEvent::Opponent { index, position } => match self.opponents.get_mut(index) {
                Some(o) => *o = position,
                None => warn!("Script places opponent {} but there are only {}", index, NUM_OPPONENTS),
            },
            SimEvent::Blocked(blocked) => self.executor.set_blocked(blocked),
            SimEvent::Note(note) => info!("Scenario: {}", note),
        }

        None
    }

    /// Flags of the sensors seeing another robot, plus any forced by the script.
    pub fn sensor_flags(&self) -> SensorSet {
        let position = self.executor.position_mm();
        let heading_rad = self.executor.heading_rad();
        let half_cone_rad = self.params.sensor_half_cone_deg.to_radians();

        let mut flags = self.forced_sensors;

        let others = self.opponents.iter().chain(std::iter::once(&self.teammate));
        for other in others.flatten() {
            let to_other = Point2::new(other.x as f64, other.y as f64) - position;
            if to_other.norm() > self.params.sensor_range_mm {
                continue;
            }

            let bearing_rad = to_other.y.atan2(to_other.x) - heading_rad;
            for sensor in Sensor::ALL.iter() {
                let look_rad = self.params.sensor_bearings_deg[sensor.index()].to_radians();
                if wrap_pi(bearing_rad - look_rad).abs() <= half_cone_rad {
                    flags.insert(*sensor);
                }
            }
        }

        flags
    }

    /// What the localisation knows this cycle.
    pub fn loc_estimates(&self) -> LocEstimates {
        LocEstimates {
            own: self.executor.pose(),
            teammate: self.teammate,
            opponents: if self.params.report_opponents {
                self.opponents
            } else {
                [None; NUM_OPPONENTS]
            },
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn params() -> SimParams {
        util::params::from_str(
            r#"
            initial_pose = { position = { x = 1000, y = 1000 }, heading_deg = 0 }
            speed_fast_mm_s = 800.0
            speed_normal_mm_s = 500.0
            speed_slow_mm_s = 250.0
            speed_very_slow_mm_s = 100.0
            turn_rate_deg_s = 180.0
            sensor_range_mm = 400.0
            sensor_half_cone_deg = 20.0
            sensor_bearings_deg = [30.0, 0.0, -30.0, 150.0, 180.0, -150.0]
            report_opponents = false
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_sensor_model() {
        let mut world = SimWorld::new(params());
        let shared = SharedSensors::new();

        assert!(world.sensor_flags().is_empty());

        // Straight ahead, in range
        world.apply(
            SimEvent::Opponent {
                index: 0,
                position: Some(Point::new(1300, 1000)),
            },
            &shared,
        );
        let flags = world.sensor_flags();
        assert!(flags.contains(Sensor::FrontCenter));
        assert!(!flags.contains(Sensor::BackCenter));

        // Out of range behind
        world.apply(
            SimEvent::Opponent {
                index: 0,
                position: Some(Point::new(500, 1000)),
            },
            &shared,
        );
        assert!(world.sensor_flags().is_empty());

        // Opponents hidden from localisation
        assert_eq!(world.loc_estimates().opponents, [None, None]);
    }

    #[test]
    fn test_events() {
        let mut world = SimWorld::new(params());
        let shared = SharedSensors::new();

        let ev: SimEvent =
            serde_json::from_str(r#"{"Nav": {"Goto": {"target": {"x": 2000, "y": 500, "a": 90}}}}"#)
                .unwrap();
        assert!(matches!(world.apply(ev, &shared), Some(NavCmd::Goto { .. })));

        let ev: SimEvent =
            serde_json::from_str(r#"{"SensorMask": [false, true, false, false, false, false]}"#)
                .unwrap();
        assert!(world.apply(ev, &shared).is_none());
        assert!(shared.snapshot().mask.contains(Sensor::FrontCenter));

        world.apply(SimEvent::Teammate(Some(Point::new(200, 200))), &shared);
        assert_eq!(world.loc_estimates().teammate, Some(Point::new(200, 200)));
    }
}
