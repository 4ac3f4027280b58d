//! # Avoidance state machine
//!
//! Reacts to the proximity sensors. The machine moves through:
//!
//! - `Clear` - Nothing detected.
//! - `Filter` - A sensor became active, wait for the debounce time to rule out noise.
//! - `Detect` - The detection is confirmed. The motion queue is paused and the position of the
//!   obstacle is recorded, then the robot waits for the stop time.
//! - `Reroute` - The recorded opponents are written into the obstacle model and a replan is
//!   requested. The sensors which triggered the detection are ignored for a while, since the
//!   robot is still facing the obstacle it is now planning around.
//!
//! The machine also keeps the dynamic obstacles of the obstacle model up to date every cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::{
        loc::{LocEstimates, NUM_OPPONENTS},
        sensors::{Sensor, SensorSet},
    },
    pos::Pose,
};
use log::{debug, info, warn};
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

pub use params::AvoidParams;

use crate::{
    geom::Point,
    motion::MotionQueue,
    obstacle::{DynamicParams, DynamicSlot, ObstacleError, ObstacleModel},
    sensors::SensorSnapshot,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Avoid {
    params: AvoidParams,
    dynamic: DynamicParams,

    state: AvoidState,

    /// Sensor mask applied in the last cycle
    mask: SensorSet,

    /// Active sensors after masking in the last cycle
    filtered: SensorSet,

    /// Countdown of the current state
    timer_ms: u32,

    /// Countdown of the recorded opponent positions' validity
    validity_ms: u32,

    /// True once the entry action of the current state has run
    action_done: bool,

    /// Sensors which confirmed the last detection
    triggers: SensorSet,

    /// Sensors ignored while rerouting
    ignore: SensorSet,

    /// Opponent positions recorded on the last detection
    opponents: [Option<Point>; NUM_OPPONENTS],
}

/// Output of one step of the machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvoidOutput {
    /// A path around the recorded opponents must be planned.
    pub replan_requested: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AvoidState {
    Clear,
    Filter,
    Detect,
    Reroute,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Avoid {
    fn default() -> Self {
        Self::new(AvoidParams::default(), DynamicParams::default())
    }
}

impl Avoid {
    pub fn new(params: AvoidParams, dynamic: DynamicParams) -> Self {
        Self {
            params,
            dynamic,
            state: AvoidState::Clear,
            mask: SensorSet::EMPTY,
            filtered: SensorSet::EMPTY,
            timer_ms: 0,
            validity_ms: 0,
            action_done: false,
            triggers: SensorSet::EMPTY,
            ignore: SensorSet::EMPTY,
            opponents: [None; NUM_OPPONENTS],
        }
    }

    /// Return to `Clear`, forgetting any detection.
    pub fn reset(&mut self) {
        *self = Self::new(self.params.clone(), self.dynamic.clone());
    }

    /// Step the machine by one cycle.
    ///
    /// Timers are decremented first, then the sensors are filtered and at most one transition is
    /// taken. The entry action of a newly entered state runs within the same step.
    pub fn step(
        &mut self,
        elapsed_ms: u32,
        sensors: SensorSnapshot,
        loc: &LocEstimates,
        obstacles: &mut ObstacleModel,
        queue: &mut MotionQueue,
    ) -> AvoidOutput {
        self.timer_ms = self.timer_ms.saturating_sub(elapsed_ms);
        self.validity_ms = self.validity_ms.saturating_sub(elapsed_ms);

        self.mask = sensors.mask;
        self.filtered = sensors.unmasked() & !self.ignore;

        let next = match self.state {
            AvoidState::Clear if !self.filtered.is_empty() => Some(AvoidState::Filter),
            AvoidState::Filter if self.filtered.is_empty() => Some(AvoidState::Clear),
            AvoidState::Filter if self.timer_ms == 0 => Some(AvoidState::Detect),
            AvoidState::Detect if self.timer_ms == 0 => Some(AvoidState::Reroute),
            AvoidState::Reroute if !self.filtered.is_empty() => Some(AvoidState::Filter),
            AvoidState::Reroute if self.timer_ms == 0 => {
                self.ignore = SensorSet::EMPTY;
                self.filtered = sensors.unmasked();

                if self.filtered.is_empty() {
                    Some(AvoidState::Clear)
                } else {
                    Some(AvoidState::Filter)
                }
            }
            _ => None,
        };

        if let Some(next) = next {
            info!(
                "Avoid: {:?} -> {:?} (sensors {:?})",
                self.state, next, self.filtered
            );
            self.state = next;
            self.action_done = false;
        }

        let mut output = AvoidOutput::default();

        if !self.action_done {
            self.enter(loc, obstacles, queue, &mut output);
            self.action_done = true;
        }

        self.refresh_dynamic(loc, obstacles);

        output
    }

    pub fn state(&self) -> AvoidState {
        self.state
    }

    pub fn timer_ms(&self) -> u32 {
        self.timer_ms
    }

    pub fn validity_ms(&self) -> u32 {
        self.validity_ms
    }

    pub fn mask(&self) -> SensorSet {
        self.mask
    }

    pub fn filtered(&self) -> SensorSet {
        self.filtered
    }

    pub fn ignore(&self) -> SensorSet {
        self.ignore
    }

    /// Opponent positions recorded on the last detection, `None` once they have expired.
    pub fn opponents(&self) -> Option<&[Option<Point>; NUM_OPPONENTS]> {
        if self.validity_ms > 0 {
            Some(&self.opponents)
        } else {
            None
        }
    }

    /// True while the robot must hold position.
    pub fn holds_motion(&self) -> bool {
        self.state == AvoidState::Detect
    }

    /// Entry action of the current state.
    fn enter(
        &mut self,
        loc: &LocEstimates,
        obstacles: &mut ObstacleModel,
        queue: &mut MotionQueue,
        output: &mut AvoidOutput,
    ) {
        match self.state {
            AvoidState::Clear => {
                self.ignore = SensorSet::EMPTY;
            }
            AvoidState::Filter => {
                self.timer_ms = self.params.debounce_ms;
            }
            AvoidState::Detect => {
                self.timer_ms = self.params.stop_ms;
                self.triggers = self.filtered;
                queue.pause();

                self.record_opponents(loc);
                self.validity_ms = self.params.opponent_validity_ms;

                info!("Avoid: detection confirmed, opponents at {:?}", self.opponents);
            }
            AvoidState::Reroute => {
                self.timer_ms = self.params.ignore_ms;
                self.ignore = self.triggers;

                if self.validity_ms > 0 {
                    for (i, opp) in self.opponents.iter().enumerate() {
                        let slot = match DynamicSlot::opponent(i) {
                            Some(s) => s,
                            None => continue,
                        };
                        let res = match opp {
                            Some(p) => self.place_dynamic(
                                obstacles,
                                slot,
                                *p,
                                self.dynamic.opponent_half_size_mm,
                                &loc.own,
                            ),
                            None => obstacles.park(slot, &self.dynamic),
                        };
                        log_write_error(slot, res);
                    }
                }

                output.replan_requested = true;
            }
        }
    }

    /// Record the opponents, from localisation if it knows where they are, otherwise from the
    /// direction of the sensors that triggered.
    fn record_opponents(&mut self, loc: &LocEstimates) {
        if loc.opponents.iter().any(|o| o.is_some()) {
            self.opponents = loc.opponents;
            return;
        }

        self.opponents = [None; NUM_OPPONENTS];
        self.opponents[0] = self.position_from_sensors(loc);
        debug!(
            "Avoid: no opponent from localisation, estimated {:?} from sensors",
            self.opponents[0]
        );
    }

    /// Point at the detection distance in the mean direction of the triggering sensors.
    fn position_from_sensors(&self, loc: &LocEstimates) -> Option<Point> {
        let heading_deg = loc.own.heading_deg as f64;
        let dirs: Vec<Vector2<f64>> = self
            .triggers
            .iter()
            .map(|s: Sensor| {
                let bearing_deg = heading_deg + self.params.sensor_bearings_deg[s.index()] as f64;
                Rotation2::new(bearing_deg.to_radians()) * Vector2::<f64>::x()
            })
            .collect();

        let first = *dirs.first()?;
        let sum: Vector2<f64> = dirs.iter().sum();

        // Opposing sensors cancel out, fall back on the first one
        let dir = if sum.norm() < 1e-6 {
            first
        } else {
            sum.normalize()
        };

        let offset = dir * self.params.detection_distance_mm as f64;
        Some(Point::new(
            loc.own.position.x + offset.x.round() as i32,
            loc.own.position.y + offset.y.round() as i32,
        ))
    }

    /// Draw a dynamic obstacle, kept clear of the robot so that plans never start inside it.
    fn place_dynamic(
        &self,
        obstacles: &mut ObstacleModel,
        slot: DynamicSlot,
        centre: Point,
        half_size_mm: i32,
        own: &Pose,
    ) -> Result<(), ObstacleError> {
        let min_dist_mm = half_size_mm + self.dynamic.own_clearance_mm;
        let placed = clear_of_robot(own, centre, min_dist_mm);
        if placed != centre {
            debug!(
                "Avoid: {:?} at {:?} is too close to the robot, drawn at {:?}",
                slot, centre, placed
            );
        }
        obstacles.set_dynamic(slot, placed, half_size_mm)
    }

    /// Write the teammate, and park the opponents once their positions have expired.
    fn refresh_dynamic(&self, loc: &LocEstimates, obstacles: &mut ObstacleModel) {
        let res = match loc.teammate {
            Some(p) => self.place_dynamic(
                obstacles,
                DynamicSlot::Teammate,
                p,
                self.dynamic.teammate_half_size_mm,
                &loc.own,
            ),
            None => obstacles.park(DynamicSlot::Teammate, &self.dynamic),
        };
        log_write_error(DynamicSlot::Teammate, res);

        if self.validity_ms == 0 {
            for slot in [DynamicSlot::Opponent1, DynamicSlot::Opponent2].iter() {
                log_write_error(*slot, obstacles.park(*slot, &self.dynamic));
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Move the centre of a square obstacle straight away from the robot until the larger of its
/// offsets from the robot is at least `min_dist_mm`. An obstacle right on top of the robot is
/// pushed out ahead of it.
pub fn clear_of_robot(own: &Pose, centre: Point, min_dist_mm: i32) -> Point {
    let offset = Vector2::new(
        (centre.x - own.position.x) as f64,
        (centre.y - own.position.y) as f64,
    );
    if offset.x.abs().max(offset.y.abs()) >= min_dist_mm as f64 {
        return centre;
    }

    let dir = if offset.x == 0.0 && offset.y == 0.0 {
        Rotation2::new((own.heading_deg as f64).to_radians()) * Vector2::<f64>::x()
    } else {
        offset
    };

    let pushed = dir * (min_dist_mm as f64 / dir.x.abs().max(dir.y.abs()));
    Point::new(
        own.position.x + pushed.x.round() as i32,
        own.position.y + pushed.y.round() as i32,
    )
}

/// Dynamic obstacles keep a constant size so writes happen in place, a failure here means the
/// model was misconfigured. The avoidance keeps running regardless.
fn log_write_error(slot: DynamicSlot, res: Result<(), ObstacleError>) {
    if let Err(e) = res {
        warn!("Could not write dynamic obstacle {:?}: {}", slot, e);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
