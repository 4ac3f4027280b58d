//! # Communications interface crate.
//!
//! Provides the types exchanged between the navigation core and its collaborators: the strategy
//! layer, the sensors, the localisation and the trajectory executor.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Positions on the playground
pub mod pos;

/// Motion directives for the trajectory executor
pub mod wp;

/// Telecommands from the strategy layer
pub mod tc;

/// Interface structures for equipment (sensors, localisation, executor)
pub mod eqpt;
