//! # Proximity sensors
//!
//! The robot carries six proximity sensors, three at the front and three at the back. Sets of
//! sensors (raw detections, masks) are carried as a compact bitfield.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of proximity sensors on the robot.
pub const NUM_SENSORS: usize = 6;

const ALL_BITS: u8 = (1 << NUM_SENSORS) - 1;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single proximity sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    FrontLeft,
    FrontCenter,
    FrontRight,
    BackLeft,
    BackCenter,
    BackRight,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A set of sensors, one bit per sensor in `Sensor::ALL` order.
///
/// Serialised as an array of six booleans so that scripts and parameter files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[bool; NUM_SENSORS]", into = "[bool; NUM_SENSORS]")]
pub struct SensorSet(u8);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Sensor {
    pub const ALL: [Sensor; NUM_SENSORS] = [
        Sensor::FrontLeft,
        Sensor::FrontCenter,
        Sensor::FrontRight,
        Sensor::BackLeft,
        Sensor::BackCenter,
        Sensor::BackRight,
    ];

    /// Index of the sensor in `Sensor::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl SensorSet {
    pub const EMPTY: SensorSet = SensorSet(0);
    pub const ALL: SensorSet = SensorSet(ALL_BITS);

    /// Build a set from its raw bits. Bits above the sixth are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        SensorSet(bits & ALL_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, sensor: Sensor) -> bool {
        self.0 & sensor.bit() != 0
    }

    pub fn insert(&mut self, sensor: Sensor) {
        self.0 |= sensor.bit();
    }

    pub fn remove(&mut self, sensor: Sensor) {
        self.0 &= !sensor.bit();
    }

    /// Iterate over the sensors in the set, in `Sensor::ALL` order.
    pub fn iter(self) -> impl Iterator<Item = Sensor> {
        Sensor::ALL.iter().copied().filter(move |s| self.contains(*s))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl From<[bool; NUM_SENSORS]> for SensorSet {
    fn from(flags: [bool; NUM_SENSORS]) -> Self {
        let mut set = SensorSet::EMPTY;
        for (sensor, flag) in Sensor::ALL.iter().zip(flags.iter()) {
            if *flag {
                set.insert(*sensor);
            }
        }
        set
    }
}

impl From<SensorSet> for [bool; NUM_SENSORS] {
    fn from(set: SensorSet) -> Self {
        let mut flags = [false; NUM_SENSORS];
        for sensor in set.iter() {
            flags[sensor.index()] = true;
        }
        flags
    }
}

impl From<Sensor> for SensorSet {
    fn from(sensor: Sensor) -> Self {
        SensorSet(sensor.bit())
    }
}

impl BitAnd for SensorSet {
    type Output = SensorSet;

    fn bitand(self, rhs: Self) -> Self::Output {
        SensorSet(self.0 & rhs.0)
    }
}

impl BitOr for SensorSet {
    type Output = SensorSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        SensorSet(self.0 | rhs.0)
    }
}

impl Not for SensorSet {
    type Output = SensorSet;

    fn not(self) -> Self::Output {
        SensorSet(!self.0 & ALL_BITS)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
