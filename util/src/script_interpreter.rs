//! # Scenario script interpreter module
//!
//! This module provides an interpreter for timed scenario scripts, allowing events to be injected
//! into a simulated run at given times.
//!
//! A script is a sequence of entries of the form `<time_s>: <json payload>;`, for example:
//!
//! ```text
//! 0.0: {"Nav": {"Goto": {"target": {"x": 2500, "y": 1500, "a": null}}}};
//! 1.5: {"Sensors": [true, false, false, false, false, false]};
//! ```
//!
//! The payload type is chosen by the caller, any type implementing `DeserializeOwned` can be
//! scripted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event which is scripted to occur at a specific time.
struct Entry<T> {
    /// The time the event is supposed to fire at
    exec_time_s: f64,

    /// The payload of the event
    event: T,
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.get_pending` to acquire the list of
/// events which are due.
pub struct ScriptInterpreter<T> {
    script_path: PathBuf,
    entries: VecDeque<Entry<T>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script entries must be in time order, {0} s follows {1} s")]
    OutOfOrder(f64, f64),

    #[error("Script contains an invalid event at {0} s: {1}")]
    InvalidEvent(f64, serde_json::Error),

    #[error("Could not build the script pattern: {0}")]
    PatternError(regex::Error),
}

/// Events which are due at the time of the query.
pub enum Pending<T> {
    None,
    Some(Vec<T>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_str(&script)?;
        interp.script_path = path;

        Ok(interp)
    }

    /// Build an interpreter from the script text itself.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut entries: VecDeque<Entry<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::PatternError)?;

        for cap in re.captures_iter(script) {
            // Groups 1 and 3 are not optional in the pattern so are present in every capture
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or_default();

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = entries.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s, last.exec_time_s));
                }
            }

            // The scripts contain JSON only.
            let event = serde_json::from_str(payload)
                .map_err(|e| ScriptError::InvalidEvent(exec_time_s, e))?;

            entries.push_back(Entry { exec_time_s, event });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: PathBuf::new(),
            entries,
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return the events due at or before `current_time_s`.
    ///
    /// The time is supplied by the caller so that simulated runs are independent of the wall
    /// clock.
    pub fn get_pending(&mut self, current_time_s: f64) -> Pending<T> {
        if self.entries.is_empty() {
            return Pending::EndOfScript;
        }

        let mut due = vec![];

        while self
            .entries
            .front()
            .map(|e| e.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            if let Some(entry) = self.entries.pop_front() {
                due.push(entry.event);
            }
        }

        if due.is_empty() {
            Pending::None
        } else {
            Pending::Some(due)
        }
    }

    /// Get the number of remaining events in the script
    pub fn get_num_events(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.entries.back().map(|e| e.exec_time_s).unwrap_or(0.0)
    }

    /// Path the script was loaded from, empty if it was built from a string.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    enum Event {
        Ping(u32),
        Stop,
    }

    #[test]
    fn test_pending_events() {
        let mut si: ScriptInterpreter<Event> = ScriptInterpreter::from_str(
            "0.0: {\"Ping\": 1};\n0.5: {\"Ping\": 2};\n2.0: \"Stop\";\n",
        )
        .unwrap();

        assert_eq!(si.get_num_events(), 3);
        assert_eq!(si.get_duration(), 2.0);

        match si.get_pending(0.6) {
            Pending::Some(v) => assert_eq!(v, vec![Event::Ping(1), Event::Ping(2)]),
            _ => panic!("Expected two events"),
        }
        assert!(matches!(si.get_pending(1.0), Pending::None));
        match si.get_pending(2.0) {
            Pending::Some(v) => assert_eq!(v, vec![Event::Stop]),
            _ => panic!("Expected the stop event"),
        }
        assert!(matches!(si.get_pending(3.0), Pending::EndOfScript));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::<Event>::from_str("nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<Event>::from_str("1.0: \"Stop\";\n0.5: \"Stop\";"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<Event>::from_str("1.0: {\"Pong\": 1};"),
            Err(ScriptError::InvalidEvent(_, _))
        ));
    }
}
