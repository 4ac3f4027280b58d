//! # Shared sensor snapshot
//!
//! The proximity sensor flags and the external sensor mask are written from outside the control
//! loop (sensor sampling, strategy). Each is a single-writer atomic bitfield, read once per cycle
//! into a [`SensorSnapshot`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicU8, Ordering};

use comms_if::eqpt::sensors::SensorSet;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SharedSensors {
    raw: AtomicU8,
    mask: AtomicU8,
}

/// Sensor state for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Sensors currently detecting something
    pub raw: SensorSet,

    /// Sensors to ignore
    pub mask: SensorSet,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SharedSensors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the raw detection flags.
    pub fn set_raw(&self, raw: SensorSet) {
        self.raw.store(raw.bits(), Ordering::Release);
    }

    /// Publish the sensor mask.
    pub fn set_mask(&self, mask: SensorSet) {
        self.mask.store(mask.bits(), Ordering::Release);
    }

    /// Read both bitfields for this cycle.
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            raw: SensorSet::from_bits(self.raw.load(Ordering::Acquire)),
            mask: SensorSet::from_bits(self.mask.load(Ordering::Acquire)),
        }
    }
}

impl SensorSnapshot {
    /// Sensors that are detecting and not masked.
    pub fn unmasked(&self) -> SensorSet {
        self.raw & !self.mask
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
