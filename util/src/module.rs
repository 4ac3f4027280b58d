//! Module interfaces
//!
//! Each cyclic module in `nav_exec` shall implement the items in this module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
///
/// Modules are explicit context objects: all state lives in the implementing struct, so any
/// number of independent instances can exist (one per simulated robot, one per test, ...).
pub trait State {
    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module.
    ///
    /// # Inputs
    /// - `init_data`: The input data required by the module
    /// - `session`: The current session, if any. Modules may save diagnostics into it.
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance. Initialisation errors are fatal.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>;

    /// Reset all run-scoped state, ready for a new match or run.
    ///
    /// Configuration loaded by `init` is kept.
    fn reset(&mut self);

    /// Main module processing function, called exactly once per control cycle.
    ///
    /// Implementations must not block and must complete in bounded time.
    ///
    /// # Inputs
    /// - `input_data`: The data required for processing by the module.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance. Processing errors are recoverable, the caller
    ///   continues with the next cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
