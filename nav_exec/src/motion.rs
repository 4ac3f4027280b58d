//! # Waypoint motion queue
//!
//! Bounded FIFO of waypoints feeding the trajectory executor. At most one waypoint is in flight
//! (sent to the executor and not yet acknowledged), and the next one is only released once the
//! executor acknowledges it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use comms_if::wp::Waypoint;
use log::debug;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of waypoints in the queue, the in-flight one included.
pub const QUEUE_CAPACITY: usize = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MotionQueue {
    entries: VecDeque<Entry>,
    paused: bool,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    waypoint: Waypoint,
    state: EntryState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Pending,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum QueueError {
    #[error("The motion queue is full")]
    QueueFull,

    #[error("No waypoint is in flight")]
    NothingInFlight,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MotionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(QUEUE_CAPACITY),
            paused: false,
        }
    }

    /// Append a waypoint to the back of the queue.
    pub fn push(&mut self, waypoint: Waypoint) -> Result<(), QueueError> {
        if self.entries.len() >= QUEUE_CAPACITY {
            return Err(QueueError::QueueFull);
        }

        self.entries.push_back(Entry {
            waypoint,
            state: EntryState::Pending,
        });

        Ok(())
    }

    /// Get the next waypoint for the executor.
    ///
    /// Returns `None` while paused or while a waypoint is already in flight. Otherwise the head of
    /// the queue is marked as sent and returned.
    pub fn next_to_send(&mut self) -> Option<Waypoint> {
        if self.paused {
            return None;
        }

        match self.entries.front_mut() {
            Some(head) if head.state == EntryState::Pending => {
                head.state = EntryState::Sent;
                Some(head.waypoint)
            }
            _ => None,
        }
    }

    /// Acknowledge the in-flight waypoint, removing it from the queue.
    pub fn ack(&mut self) -> Result<Waypoint, QueueError> {
        if self.in_flight().is_none() {
            return Err(QueueError::NothingInFlight);
        }

        self.entries
            .pop_front()
            .map(|e| e.waypoint)
            .ok_or(QueueError::NothingInFlight)
    }

    /// Stop releasing waypoints. The in-flight waypoint stays in flight.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("Motion queue paused");
        }
        self.paused = true;
    }

    /// Continue releasing waypoints, starting with the one in flight when the queue was paused.
    pub fn resume(&mut self) {
        if self.paused {
            debug!("Motion queue resumed");
        }
        self.paused = false;
    }

    /// Discard every waypoint. Returns true if a waypoint was in flight.
    ///
    /// The paused flag is kept.
    pub fn flush(&mut self) -> bool {
        let was_in_flight = self.in_flight().is_some();
        self.entries.clear();
        was_in_flight
    }

    /// The waypoint sent to the executor and not yet acknowledged.
    pub fn in_flight(&self) -> Option<&Waypoint> {
        self.entries
            .front()
            .filter(|e| e.state == EntryState::Sent)
            .map(|e| &e.waypoint)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
