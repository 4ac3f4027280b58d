//! Implementations for the NavCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::{
        executor::{ExecutorCmd, ExecutorStatus},
        loc::LocEstimates,
        sensors::SensorSet,
    },
    pos::Poi,
    tc::NavCmd,
    wp::{SpeedProfile, Waypoint},
};
use log::{debug, info, warn};
use serde::Serialize;
use util::{module::State, params, session::Session};

use super::{NavCtrlError, Params};
use crate::{
    avoid::{Avoid, AvoidState},
    geom::Point,
    motion::MotionQueue,
    obstacle::{DynamicSlot, ObstacleModel, StaticObstacles},
    plan::{waypoints, PlanError, Planner},
    sensors::SensorSnapshot,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation control module state
#[derive(Debug, Default)]
pub struct NavCtrl {
    params: Params,
    initialised: bool,

    obstacles: ObstacleModel,
    avoid: Avoid,
    planner: Planner,
    queue: MotionQueue,

    /// Current goal, `None` once reached or stopped
    goal: Option<Poi>,

    /// Speed profile of the current goal's waypoints
    speed: SpeedProfile,

    /// Sensor mask set by command, combined with the mask of the sensor snapshot
    cmd_mask: SensorSet,

    /// A replan to the current goal is needed
    replan_pending: bool,

    /// Obstacle revision and start of the last replan that failed. A failed replan is only
    /// retried once one of them changes.
    failed_replan: Option<(u64, Point)>,

    /// Number of replans actually run
    num_replan_attempts: u64,

    /// A flush dropped the waypoint in flight, the executor must abort it
    abort_pending: bool,

    /// The executor was told to pause and has not been resumed yet
    exec_paused: bool,

    last_plan: Option<PlanOutcome>,
}

/// Input data to Navigation Control.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Time elapsed since the previous cycle
    pub elapsed_ms: u32,

    pub sensors: SensorSnapshot,

    pub loc: LocEstimates,

    pub exec_status: ExecutorStatus,

    /// New command on this cycle, if any
    pub cmd: Option<NavCmd>,
}

/// Commands for the executor, in the order they must be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputData {
    pub exec_cmds: Vec<ExecutorCmd>,
}

/// Status report for NavCtrl processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub avoid_state: AvoidState,
    pub queue_len: usize,
    pub queue_paused: bool,
    pub goal: Option<Poi>,
    pub replan_pending: bool,
    pub last_plan: Option<PlanOutcome>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of the most recent plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanOutcome {
    Planned { num_checkpoints: usize, length_mm: u32 },
    Failed(PlanError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavCtrl {
    /// Build an initialised NavCtrl from its parameters and the static obstacles.
    pub fn with_params(params: Params, statics: &StaticObstacles) -> Result<Self, NavCtrlError> {
        let mut obstacles = ObstacleModel::new();
        obstacles.load_static(statics)?;
        for slot in DynamicSlot::ALL.iter() {
            obstacles.park(*slot, &params.dynamic)?;
        }

        Ok(Self {
            avoid: Avoid::new(params.avoid.clone(), params.dynamic.clone()),
            planner: Planner::new(params.planner.clone(), params.playground),
            speed: params.planner.speed,
            params,
            initialised: true,
            obstacles,
            ..Default::default()
        })
    }

    pub fn obstacles(&self) -> &ObstacleModel {
        &self.obstacles
    }

    pub fn avoid(&self) -> &Avoid {
        &self.avoid
    }

    pub fn queue(&self) -> &MotionQueue {
        &self.queue
    }

    pub fn num_replan_attempts(&self) -> u64 {
        self.num_replan_attempts
    }

    fn handle_cmd(&mut self, cmd: NavCmd, own: Point) -> Result<(), NavCtrlError> {
        info!("NavCtrl command: {:?}", cmd);

        match cmd {
            NavCmd::Goto { target, speed } => {
                if target.a.is_some() {
                    debug!("Goal orientation is left to the executor");
                }

                let speed = speed.unwrap_or(self.params.planner.speed);
                match self.plan_to(own, target, speed) {
                    Ok(wps) => {
                        self.goal = Some(target);
                        self.speed = speed;
                        self.replan_pending = false;
                        self.failed_replan = None;
                        self.load_plan(wps)?;
                    }
                    Err(e) => warn!("Cannot go to {:?}: {}, keeping the current plan", target, e),
                }
            }
            NavCmd::Stop => self.stop(),
            NavCmd::SetSensorMask(mask) => self.cmd_mask = mask,
            NavCmd::Reset => self.reset(),
        }

        Ok(())
    }

    /// Drop the current plan and goal.
    fn stop(&mut self) {
        if self.queue.flush() {
            self.abort_pending = true;
        }
        self.goal = None;
        self.replan_pending = false;
        self.failed_replan = None;
    }

    fn request_replan(&mut self, reason: &str) {
        if self.goal.is_some() {
            if !self.replan_pending {
                info!("Replan requested: {}", reason);
            }
            self.replan_pending = true;
        }
    }

    /// Attempt the pending replan. On failure the queue stays paused and the replan is retried
    /// once the obstacles or the robot's position change.
    fn service_replan(&mut self, own: Point) -> Result<(), NavCtrlError> {
        let goal = match (self.replan_pending, self.goal) {
            (true, Some(g)) => g,
            _ => {
                self.replan_pending = false;
                self.failed_replan = None;
                return Ok(());
            }
        };

        // Same obstacles from the same place would give the same answer
        let attempt = (self.obstacles.revision(), own);
        if self.failed_replan == Some(attempt) {
            return Ok(());
        }

        self.num_replan_attempts += 1;
        match self.plan_to(own, goal, self.speed) {
            Ok(wps) => {
                self.replan_pending = false;
                self.failed_replan = None;
                self.load_plan(wps)?;
            }
            Err(PlanError::CapacityExceeded(n)) => {
                warn!("Replan skipped, graph over {} edges, holding position", n);
                self.failed_replan = Some(attempt);
            }
            Err(PlanError::NoPath) => {
                info!("Replan found no path, holding position until the obstacles change");
                self.failed_replan = Some(attempt);
            }
        }

        Ok(())
    }

    fn plan_to(
        &mut self,
        own: Point,
        goal: Poi,
        speed: SpeedProfile,
    ) -> Result<Vec<Waypoint>, PlanError> {
        let result = self.planner.plan(&self.obstacles, own, goal.point());

        self.last_plan = Some(match result {
            Ok(ref sol) => PlanOutcome::Planned {
                num_checkpoints: sol.checkpoints.len(),
                length_mm: sol.length_mm,
            },
            Err(e) => PlanOutcome::Failed(e),
        });

        result.map(|sol| waypoints::from_checkpoints(&sol.checkpoints, speed))
    }

    /// Replace the queue's contents with a new plan and release it, unless the avoidance is
    /// holding the robot.
    fn load_plan(&mut self, wps: Vec<Waypoint>) -> Result<(), NavCtrlError> {
        if self.queue.flush() {
            self.abort_pending = true;
        }

        for wp in wps {
            self.queue.push(wp)?;
        }

        if !self.avoid.holds_motion() {
            self.queue.resume();
        }

        Ok(())
    }

    fn handle_exec_status(&mut self, status: ExecutorStatus) {
        match status {
            ExecutorStatus::Finished => match self.queue.ack() {
                Ok(wp) => {
                    debug!("Waypoint done: {:?}", wp.target);
                    if self.queue.is_empty() {
                        info!("Goal {:?} reached", self.goal);
                        self.goal = None;
                    }
                }
                Err(e) => warn!("Executor finished a waypoint but: {}", e),
            },
            ExecutorStatus::Blocked => {
                if !self.queue.is_paused() {
                    warn!("Executor blocked, pausing");
                }
                self.queue.pause();
                self.request_replan("executor blocked");
            }
            ExecutorStatus::Idle | ExecutorStatus::Busy => (),
        }
    }

    fn emit(&mut self, output: &mut OutputData) {
        if self.abort_pending {
            output.exec_cmds.push(ExecutorCmd::Abort);
            self.abort_pending = false;
            self.exec_paused = false;
        }

        if self.queue.is_paused() {
            if !self.exec_paused && self.queue.in_flight().is_some() {
                output.exec_cmds.push(ExecutorCmd::Pause);
                self.exec_paused = true;
            }
        } else if self.exec_paused {
            output.exec_cmds.push(ExecutorCmd::Resume);
            self.exec_paused = false;
        }

        if let Some(wp) = self.queue.next_to_send() {
            output.exec_cmds.push(ExecutorCmd::Execute(wp));
        }
    }

    fn status_report(&self) -> StatusReport {
        StatusReport {
            avoid_state: self.avoid.state(),
            queue_len: self.queue.len(),
            queue_paused: self.queue.is_paused(),
            goal: self.goal,
            replan_pending: self.replan_pending,
            last_plan: self.last_plan,
        }
    }
}

impl State for NavCtrl {
    type InitData = &'static str;
    type InitError = NavCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;
        let statics: StaticObstacles = params::load(&params.obstacles_file)?;

        *self = Self::with_params(params, &statics)?;

        if let Some(session) = session {
            session.save("nav_ctrl/static_obstacles.json", statics);
        }

        Ok(())
    }

    fn reset(&mut self) {
        info!("NavCtrl reset");

        self.stop();
        self.queue.resume();
        self.avoid.reset();
        self.cmd_mask = SensorSet::EMPTY;
        self.speed = self.params.planner.speed;
        self.last_plan = None;

        for slot in DynamicSlot::ALL.iter() {
            if let Err(e) = self.obstacles.park(*slot, &self.params.dynamic) {
                warn!("Could not park {:?}: {}", slot, e);
            }
        }
    }

    /// Perform cyclic processing of Navigation Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(NavCtrlError::NotInitialised);
        }

        let mut output = OutputData::default();
        let own = input_data.loc.own.position;

        if let Some(cmd) = input_data.cmd {
            self.handle_cmd(cmd, own)?;
        }

        let sensors = SensorSnapshot {
            raw: input_data.sensors.raw,
            mask: input_data.sensors.mask | self.cmd_mask,
        };
        let avoid_out = self.avoid.step(
            input_data.elapsed_ms,
            sensors,
            &input_data.loc,
            &mut self.obstacles,
            &mut self.queue,
        );
        if avoid_out.replan_requested {
            self.request_replan("avoidance");
        }

        self.service_replan(own)?;

        self.handle_exec_status(input_data.exec_status);

        self.emit(&mut output);

        Ok((output, self.status_report()))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::{eqpt::sensors::Sensor, pos::Pose};

    const PARAMS: &str = r#"
        obstacles_file = "obstacles.toml"

        [playground]
        width_mm = 3000
        height_mm = 2000

        [planner]
        speed = "Normal"

        [avoid]
        debounce_ms = 50
        stop_ms = 500
        ignore_ms = 1000
        opponent_validity_ms = 3000
        detection_distance_mm = 400
        sensor_bearings_deg = [30, 0, -30, 150, 180, -150]

        [dynamic]
        teammate_half_size_mm = 150
        opponent_half_size_mm = 200
        park_position = { x = -1000, y = -1000 }
    "#;

    const OBSTACLES: &str = r#"
        [[polygons]]
        name = "pit"
        points = [
            { x = 200, y = 1600 },
            { x = 600, y = 1600 },
            { x = 600, y = 1900 },
            { x = 200, y = 1900 },
        ]
    "#;

    fn nav_ctrl() -> NavCtrl {
        let params: Params = util::params::from_str(PARAMS).unwrap();
        let statics: StaticObstacles = util::params::from_str(OBSTACLES).unwrap();
        NavCtrl::with_params(params, &statics).unwrap()
    }

    fn input(cmd: Option<NavCmd>, raw: SensorSet, exec_status: ExecutorStatus) -> InputData {
        InputData {
            elapsed_ms: 10,
            sensors: SensorSnapshot {
                raw,
                mask: SensorSet::EMPTY,
            },
            loc: LocEstimates {
                own: Pose::new(1000, 1000, 0),
                ..Default::default()
            },
            exec_status,
            cmd,
        }
    }

    fn goto(x: i32, y: i32) -> Option<NavCmd> {
        Some(NavCmd::Goto {
            target: Poi::new(x, y, None),
            speed: None,
        })
    }

    fn idle() -> InputData {
        input(None, SensorSet::EMPTY, ExecutorStatus::Busy)
    }

    #[test]
    fn test_not_initialised() {
        let mut nc = NavCtrl::default();

        assert!(matches!(nc.proc(&idle()), Err(NavCtrlError::NotInitialised)));
    }

    #[test]
    fn test_init_parks_dynamic() {
        let nc = nav_ctrl();

        assert!(nc.obstacles().is_static(0));
        assert_eq!(nc.obstacles().num_polygons(), 4);
        assert_eq!(
            nc.obstacles().polygon(DynamicSlot::Teammate.id()).unwrap()[0],
            Point::new(-1150, -1150)
        );
    }

    #[test]
    fn test_goto_and_finish() {
        let mut nc = nav_ctrl();

        let (out, status) = nc
            .proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();

        assert_eq!(
            out.exec_cmds,
            vec![ExecutorCmd::Execute(Waypoint::goto(
                Point::new(2500, 1000),
                SpeedProfile::Normal,
                true
            ))]
        );
        assert_eq!(status.queue_len, 1);
        assert_eq!(
            status.last_plan,
            Some(PlanOutcome::Planned {
                num_checkpoints: 1,
                length_mm: 1500
            })
        );

        // Nothing more to send while the executor works
        let (out, _) = nc.proc(&idle()).unwrap();
        assert!(out.exec_cmds.is_empty());

        // Finished acks the waypoint, reaching the goal
        let (_, status) = nc
            .proc(&input(None, SensorSet::EMPTY, ExecutorStatus::Finished))
            .unwrap();
        assert_eq!(status.queue_len, 0);
        assert_eq!(status.goal, None);
    }

    #[test]
    fn test_unreachable_goal_keeps_plan() {
        let mut nc = nav_ctrl();

        nc.proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();

        // Goal inside the static pit
        let (out, status) = nc
            .proc(&input(goto(400, 1750), SensorSet::EMPTY, ExecutorStatus::Busy))
            .unwrap();

        assert!(out.exec_cmds.is_empty());
        assert_eq!(status.last_plan, Some(PlanOutcome::Failed(PlanError::NoPath)));
        assert_eq!(status.goal, Some(Poi::new(2500, 1000, None)));
        assert_eq!(status.queue_len, 1);
    }

    #[test]
    fn test_detection_pauses_then_reroutes() {
        let mut nc = nav_ctrl();
        let front = SensorSet::from(Sensor::FrontCenter);

        nc.proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();

        // Debounce, then detection pauses the executor
        for _ in 0..5 {
            let (out, status) = nc.proc(&input(None, front, ExecutorStatus::Busy)).unwrap();
            assert!(out.exec_cmds.is_empty());
            assert_eq!(status.avoid_state, AvoidState::Filter);
        }
        let (out, status) = nc.proc(&input(None, front, ExecutorStatus::Busy)).unwrap();
        assert_eq!(status.avoid_state, AvoidState::Detect);
        assert_eq!(out.exec_cmds, vec![ExecutorCmd::Pause]);

        // Hold during the stop time
        for _ in 0..49 {
            let (out, status) = nc.proc(&input(None, front, ExecutorStatus::Busy)).unwrap();
            assert!(out.exec_cmds.is_empty());
            assert!(status.queue_paused);
        }

        // Reroute: the old waypoint is aborted and the new path goes around the opponent
        let (out, status) = nc.proc(&input(None, front, ExecutorStatus::Busy)).unwrap();
        assert_eq!(status.avoid_state, AvoidState::Reroute);
        assert!(!status.queue_paused);
        assert!(!status.replan_pending);
        assert_eq!(out.exec_cmds.len(), 2);
        assert_eq!(out.exec_cmds[0], ExecutorCmd::Abort);
        match out.exec_cmds[1] {
            ExecutorCmd::Execute(wp) => {
                assert_ne!(wp.target_point(), Some(Point::new(2500, 1000)));
                assert!(!wp.must_finish);
            }
            ref c => panic!("Expected an Execute command, got {:?}", c),
        }
        assert!(status.queue_len >= 2);
    }

    #[test]
    fn test_blocked_replans() {
        let mut nc = nav_ctrl();

        nc.proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();

        let (out, status) = nc
            .proc(&input(None, SensorSet::EMPTY, ExecutorStatus::Blocked))
            .unwrap();
        assert_eq!(out.exec_cmds, vec![ExecutorCmd::Pause]);
        assert!(status.replan_pending);

        let (out, status) = nc.proc(&idle()).unwrap();
        assert!(!status.replan_pending);
        assert!(!status.queue_paused);
        assert_eq!(out.exec_cmds.len(), 2);
        assert_eq!(out.exec_cmds[0], ExecutorCmd::Abort);
        assert!(matches!(out.exec_cmds[1], ExecutorCmd::Execute(_)));
    }

    #[test]
    fn test_stop_and_mask() {
        let mut nc = nav_ctrl();

        nc.proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();
        let (out, status) = nc
            .proc(&input(Some(NavCmd::Stop), SensorSet::EMPTY, ExecutorStatus::Busy))
            .unwrap();
        assert_eq!(out.exec_cmds, vec![ExecutorCmd::Abort]);
        assert_eq!(status.goal, None);
        assert_eq!(status.queue_len, 0);

        // Masked by command, the sensor never leaves Clear
        let front = SensorSet::from(Sensor::FrontCenter);
        nc.proc(&input(
            Some(NavCmd::SetSensorMask(front)),
            front,
            ExecutorStatus::Idle,
        ))
        .unwrap();
        let (_, status) = nc.proc(&input(None, front, ExecutorStatus::Idle)).unwrap();
        assert_eq!(status.avoid_state, AvoidState::Clear);
    }

    #[test]
    fn test_detour_around_detected_opponent() {
        let mut nc = nav_ctrl();
        let front = SensorSet::from(Sensor::FrontCenter);
        let goal = Point::new(2000, 1000);
        let opponent = Point::new(1300, 1000);

        let (out, _) = nc
            .proc(&input(goto(goal.x, goal.y), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();
        assert_eq!(
            out.exec_cmds,
            vec![ExecutorCmd::Execute(Waypoint::goto(goal, SpeedProfile::Normal, true))]
        );

        // The opponent steps in front: debounce, stop, then reroute
        let mut seen = input(None, front, ExecutorStatus::Busy);
        seen.loc.opponents = [Some(opponent), None];
        for _ in 0..55 {
            nc.proc(&seen).unwrap();
        }
        seen.sensors.raw = SensorSet::EMPTY;
        let (out, status) = nc.proc(&seen).unwrap();
        assert_eq!(status.avoid_state, AvoidState::Reroute);
        assert!(matches!(
            status.last_plan,
            Some(PlanOutcome::Planned {
                num_checkpoints: 3,
                ..
            })
        ));
        assert_eq!(out.exec_cmds[0], ExecutorCmd::Abort);

        let mut targets = Vec::new();
        let mut next = match out.exec_cmds.get(1) {
            Some(ExecutorCmd::Execute(wp)) => wp.target_point(),
            c => panic!("Expected the first detour waypoint, got {:?}", c),
        };

        // Follow the detour, the executor finishing each waypoint where it was sent
        while let Some(target) = next {
            targets.push(target);

            let mut done = input(None, SensorSet::EMPTY, ExecutorStatus::Finished);
            done.loc.own = Pose::new(target.x, target.y, 0);
            done.loc.opponents = [Some(opponent), None];
            let (out, status) = nc.proc(&done).unwrap();

            next = match out.exec_cmds.first() {
                Some(ExecutorCmd::Execute(wp)) => wp.target_point(),
                _ => None,
            };
            if next.is_none() {
                assert_eq!(status.goal, None);
                assert_eq!(status.queue_len, 0);
            }
            assert!(targets.len() <= 3);
        }

        // Two corners of the opponent's square, then the goal
        let corners = crate::obstacle::square(opponent, 200);
        assert_eq!(targets.len(), 3);
        assert!(corners.contains(&targets[0]));
        assert!(corners.contains(&targets[1]));
        assert_eq!(targets[2], goal);
    }

    #[test]
    fn test_failed_replan_waits_for_change() {
        let mut nc = nav_ctrl();

        nc.proc(&input(goto(2500, 1000), SensorSet::EMPTY, ExecutorStatus::Idle))
            .unwrap();

        // The teammate stops on the goal just as the executor gets blocked
        let mut blocked = input(None, SensorSet::EMPTY, ExecutorStatus::Blocked);
        blocked.loc.teammate = Some(Point::new(2500, 1000));
        let (out, status) = nc.proc(&blocked).unwrap();
        assert_eq!(out.exec_cmds, vec![ExecutorCmd::Pause]);
        assert!(status.replan_pending);
        assert_eq!(nc.num_replan_attempts(), 0);

        let mut waiting = idle();
        waiting.loc.teammate = Some(Point::new(2500, 1000));
        let (_, status) = nc.proc(&waiting).unwrap();
        assert_eq!(status.last_plan, Some(PlanOutcome::Failed(PlanError::NoPath)));
        assert!(status.replan_pending);
        assert_eq!(nc.num_replan_attempts(), 1);

        // Nothing moves, so nothing is planned again
        for _ in 0..20 {
            let (out, status) = nc.proc(&waiting).unwrap();
            assert!(out.exec_cmds.is_empty());
            assert!(status.queue_paused);
        }
        assert_eq!(nc.num_replan_attempts(), 1);

        // The teammate leaves the goal, the replan goes through
        waiting.loc.teammate = Some(Point::new(2500, 1500));
        let (out, status) = nc.proc(&waiting).unwrap();
        assert_eq!(nc.num_replan_attempts(), 2);
        assert!(!status.replan_pending);
        assert!(!status.queue_paused);
        assert_eq!(out.exec_cmds.len(), 2);
        assert_eq!(out.exec_cmds[0], ExecutorCmd::Abort);
        assert!(matches!(out.exec_cmds[1], ExecutorCmd::Execute(_)));
    }
}
