//! # Simulated trajectory executor
//!
//! A purely kinematic stand-in for the real executor: the robot moves in a straight line towards
//! each target at the waypoint's speed, and turns on the spot at a fixed rate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::executor::{ExecutorCmd, ExecutorStatus},
    pos::Pose,
    wp::{MotionType, Waypoint, WpTarget},
};
use log::{debug, warn};
use nalgebra::{Point2, Rotation2, Vector2};
use util::maths::{wrap_deg, wrap_pi};

use super::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimExecutor {
    params: SimParams,

    position_mm: Point2<f64>,
    heading_rad: f64,

    current: Option<Active>,
    paused: bool,
    blocked: bool,
}

/// A waypoint being executed, with its target resolved to absolute coordinates.
#[derive(Debug, Clone, Copy)]
struct Active {
    waypoint: Waypoint,
    target_mm: Point2<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimExecutor {
    pub fn new(params: SimParams) -> Self {
        let pose = params.initial_pose;
        Self {
            position_mm: Point2::new(pose.position.x as f64, pose.position.y as f64),
            heading_rad: (pose.heading_deg as f64).to_radians(),
            params,
            current: None,
            paused: false,
            blocked: false,
        }
    }

    /// Apply the commands issued this cycle, in order.
    pub fn apply(&mut self, cmds: &[ExecutorCmd]) {
        for cmd in cmds {
            match cmd {
                ExecutorCmd::Execute(wp) => {
                    if self.current.is_some() {
                        warn!("SimExecutor: new waypoint while another is in progress, replacing it");
                    }
                    self.current = Some(Active {
                        waypoint: *wp,
                        target_mm: self.resolve(wp),
                    });
                    self.paused = false;
                }
                ExecutorCmd::Pause => self.paused = true,
                ExecutorCmd::Resume => self.paused = false,
                ExecutorCmd::Abort => {
                    self.current = None;
                    self.paused = false;
                }
            }
        }
    }

    /// Simulate the executor for one cycle and return its status.
    pub fn step(&mut self, dt_s: f64) -> ExecutorStatus {
        let active = match self.current {
            Some(a) => a,
            None => return ExecutorStatus::Idle,
        };

        if self.blocked {
            return ExecutorStatus::Blocked;
        }
        if self.paused {
            return ExecutorStatus::Busy;
        }

        let done = match active.waypoint.motion {
            MotionType::NoMotion => true,
            MotionType::OrientFront => self.turn_towards(active.target_mm, false, dt_s),
            MotionType::OrientBehind => self.turn_towards(active.target_mm, true, dt_s),
            MotionType::GotoBackward => self.drive_to(&active, true, dt_s),
            MotionType::GotoAuto | MotionType::GotoForward | MotionType::MoveRelative => {
                self.drive_to(&active, false, dt_s)
            }
        };

        if done {
            debug!("SimExecutor: waypoint reached at {:?}", self.pose());
            self.current = None;
            ExecutorStatus::Finished
        } else {
            ExecutorStatus::Busy
        }
    }

    /// Make the executor report `Blocked` while it has a waypoint.
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn pose(&self) -> Pose {
        Pose::new(
            self.position_mm.x.round() as i32,
            self.position_mm.y.round() as i32,
            wrap_deg(self.heading_rad.to_degrees().round() as i32),
        )
    }

    pub fn position_mm(&self) -> Point2<f64> {
        self.position_mm
    }

    pub fn heading_rad(&self) -> f64 {
        self.heading_rad
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Absolute target of a waypoint given the current pose.
    fn resolve(&self, wp: &Waypoint) -> Point2<f64> {
        match wp.target {
            WpTarget::Absolute(p) => Point2::new(p.x as f64, p.y as f64),
            WpTarget::Relative { dist_mm, angle_deg } => {
                let dir = Rotation2::new(self.heading_rad + (angle_deg as f64).to_radians())
                    * Vector2::<f64>::x();
                self.position_mm + dir * dist_mm as f64
            }
        }
    }

    /// Move towards the target, returns true once it is reached.
    fn drive_to(&mut self, active: &Active, backwards: bool, dt_s: f64) -> bool {
        let to_target = active.target_mm - self.position_mm;
        let dist_mm = to_target.norm();
        let step_mm = self.params.speed_mm_s(active.waypoint.speed) * dt_s;

        if dist_mm <= step_mm {
            self.position_mm = active.target_mm;
            return true;
        }

        let dir = to_target / dist_mm;
        self.position_mm += dir * step_mm;

        let travel_heading = dir.y.atan2(dir.x);
        self.heading_rad = if backwards {
            wrap_pi(travel_heading + std::f64::consts::PI)
        } else {
            travel_heading
        };

        false
    }

    /// Turn on the spot so that the front (or back) faces the target, returns true once it does.
    fn turn_towards(&mut self, target_mm: Point2<f64>, behind: bool, dt_s: f64) -> bool {
        let to_target = target_mm - self.position_mm;
        if to_target.norm() < f64::EPSILON {
            return true;
        }

        let mut desired = to_target.y.atan2(to_target.x);
        if behind {
            desired += std::f64::consts::PI;
        }

        let error = wrap_pi(desired - self.heading_rad);
        let step = self.params.turn_rate_deg_s.to_radians() * dt_s;

        if error.abs() <= step {
            self.heading_rad = wrap_pi(desired);
            true
        } else {
            self.heading_rad = wrap_pi(self.heading_rad + step * error.signum());
            false
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
