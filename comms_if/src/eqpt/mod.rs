//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the equipment surrounding the
//! navigation core.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod executor;
pub mod loc;
pub mod sensors;
