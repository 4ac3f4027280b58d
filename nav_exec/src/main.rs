//! Navigation executable entry point.
//!
//! # Architecture
//!
//! The executable runs the navigation core against a simulated world, driven by a scenario script.
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Scenario event processing
//!         - Sensor acquisition
//!         - Navigation control processing
//!         - Executor simulation
//!         - Status reporting
//!
//! Simulated time advances by exactly one cycle period per cycle, so a run is reproducible
//! whether or not it is paced in real time.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use nav_lib::{
    data_store::DataStore,
    params::NavExecParams,
    sensors::SharedSensors,
    sim::{SimEvent, SimWorld},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{Pending, ScriptInterpreter},
    session::Session,
    time::period_to_millis,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command line arguments.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Run the navigation core against a scenario script")]
struct Args {
    /// Path to the scenario script
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum level of the log records (info, debug or trace)
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,

    /// Log the visibility graph construction at trace level
    #[structopt(long)]
    trace_planner: bool,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, args.trace_planner, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", args.script);

    let mut si: ScriptInterpreter<SimEvent> =
        ScriptInterpreter::new(&args.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} events\n",
        si.get_duration(),
        si.get_num_events()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.nav_ctrl
        .init("nav_ctrl.toml", Some(&session))
        .wrap_err("Failed to initialise NavCtrl")?;
    info!("NavCtrl init complete");

    let sensors = SharedSensors::new();
    let mut world = SimWorld::new(exec_params.sim.clone());
    info!("Simulated world init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let elapsed_ms = period_to_millis(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_period_s, exec_params.status_period_cycles);

        // ---- SCENARIO PROCESSING ----

        match si.get_pending(ds.sim_time_s) {
            Pending::None => (),
            Pending::Some(events) => {
                for event in events {
                    debug!("Scenario event at {:.03} s: {:?}", ds.sim_time_s, event);
                    if let Some(cmd) = world.apply(event, &sensors) {
                        ds.push_cmd(cmd);
                    }
                }
            }
            // Exit if end of script reached
            Pending::EndOfScript => {
                info!("End of scenario script reached, stopping");
                break;
            }
        }

        // ---- DATA INPUT ----

        sensors.set_raw(world.sensor_flags());

        ds.nav_ctrl_input.elapsed_ms = elapsed_ms;
        ds.nav_ctrl_input.sensors = sensors.snapshot();
        ds.nav_ctrl_input.loc = world.loc_estimates();
        ds.nav_ctrl_input.exec_status = ds.exec_status;
        ds.nav_ctrl_input.cmd = ds.pending_cmds.pop_front();

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.nav_ctrl.proc(&ds.nav_ctrl_input) {
            Ok((o, r)) => {
                ds.nav_ctrl_output = o;
                ds.nav_ctrl_status_rpt = Some(r);
                ds.num_consec_nav_ctrl_errors = 0;
            }
            Err(e) => {
                // Errors are usually a bad command, so just issue the warning and continue,
                // unless they keep coming.
                warn!("Error during NavCtrl processing: {}", e);

                if ds.nav_ctrl_error(exec_params.max_consec_nav_ctrl_errors) {
                    error!(
                        "More than {} consecutive NavCtrl errors, stopping",
                        exec_params.max_consec_nav_ctrl_errors
                    );
                    break;
                }
            }
        }

        // ---- EXECUTOR ----

        world.executor.apply(&ds.nav_ctrl_output.exec_cmds);
        ds.exec_status = world.executor.step(exec_params.cycle_period_s);

        // ---- STATUS ----

        if ds.is_status_cycle {
            if let Some(ref rpt) = ds.nav_ctrl_status_rpt {
                info!(
                    "t = {:.02} s, pose = {:?}, exec = {:?}, avoid = {:?}, queue = {}",
                    ds.sim_time_s,
                    world.executor.pose(),
                    ds.exec_status,
                    rpt.avoid_state,
                    rpt.queue_len
                );
                session.save(format!("nav_ctrl/status_{:08}.json", ds.num_cycles), *rpt);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                if exec_params.real_time {
                    thread::sleep(d);
                }
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                // If number of overruns greater than the limit exit
                if ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    error!(
                        "More than {} consecutive cycle overruns, stopping",
                        exec_params.max_consec_cycle_overruns
                    );
                    break;
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!(
        "Final pose after {} cycles: {:?}",
        ds.num_cycles,
        world.executor.pose()
    );
    info!("End of execution");

    session.exit();

    Ok(())
}
