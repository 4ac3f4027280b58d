//! # Data Store

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use comms_if::{eqpt::executor::ExecutorStatus, tc::NavCmd};
use log::warn;

use crate::nav_ctrl;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// True if a status report is due this cycle
    pub is_status_cycle: bool,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // Commands
    /// Navigation commands waiting to be passed to NavCtrl, one per cycle
    pub pending_cmds: VecDeque<NavCmd>,

    // Executor
    pub exec_status: ExecutorStatus,

    // NavCtrl
    pub nav_ctrl: nav_ctrl::NavCtrl,
    pub nav_ctrl_input: nav_ctrl::InputData,
    pub nav_ctrl_output: nav_ctrl::OutputData,
    pub nav_ctrl_status_rpt: Option<nav_ctrl::StatusReport>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive NavCtrl processing errors
    pub num_consec_nav_ctrl_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, sets the status cycle flag,
    /// and advances the simulation time.
    pub fn cycle_start(&mut self, cycle_period_s: f64, status_period_cycles: u64) {
        self.is_status_cycle = self.num_cycles % status_period_cycles.max(1) == 0;

        self.nav_ctrl_input = nav_ctrl::InputData::default();
        self.nav_ctrl_output = nav_ctrl::OutputData::default();
        self.nav_ctrl_status_rpt = None;

        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Queue a command for NavCtrl.
    pub fn push_cmd(&mut self, cmd: NavCmd) {
        if !self.pending_cmds.is_empty() {
            warn!(
                "{} commands already waiting, {:?} will be delayed",
                self.pending_cmds.len(),
                cmd
            );
        }
        self.pending_cmds.push_back(cmd);
    }

    /// Count a failed NavCtrl cycle. Returns true once more than `limit` cycles in a row have
    /// failed.
    pub fn nav_ctrl_error(&mut self, limit: u64) -> bool {
        self.num_consec_nav_ctrl_errors += 1;
        self.num_consec_nav_ctrl_errors > limit
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();

        ds.cycle_start(0.01, 100);
        assert!(ds.is_status_cycle);
        assert_eq!(ds.sim_time_s, 0.0);
        ds.cycle_end();

        ds.cycle_start(0.01, 100);
        assert!(!ds.is_status_cycle);
        assert!((ds.sim_time_s - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_nav_ctrl_error_limit() {
        let mut ds = DataStore::default();

        assert!(!ds.nav_ctrl_error(2));
        assert!(!ds.nav_ctrl_error(2));
        assert!(ds.nav_ctrl_error(2));

        // A good cycle in between starts the count again
        ds.num_consec_nav_ctrl_errors = 0;
        assert!(!ds.nav_ctrl_error(2));
        assert_eq!(ds.num_consec_nav_ctrl_errors, 1);
    }
}
