//! # Telecommand module
//!
//! Commands sent to the navigation core by the strategy layer.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{eqpt::sensors::SensorSet, pos::Poi, wp::SpeedProfile};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavCmd {
    /// Plan a path to the target and start following it.
    Goto {
        target: Poi,

        /// Speed profile override, the configured default is used if `None`.
        #[serde(default)]
        speed: Option<SpeedProfile>,
    },

    /// Drop the current plan and stop.
    Stop,

    /// Replace the external sensor mask. Masked sensors are never considered by the avoidance.
    SetSensorMask(SensorSet),

    /// Reset the navigation state for a new match.
    Reset,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavCmd {
    /// Parse a command from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        Ok(serde_json::from_str(json_str)?)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_goto() {
        let cmd = NavCmd::from_json(r#"{"Goto": {"target": {"x": 2500, "y": 1500, "a": null}}}"#)
            .unwrap();

        assert_eq!(
            cmd,
            NavCmd::Goto {
                target: Poi::new(2500, 1500, None),
                speed: None
            }
        );

        assert!(NavCmd::from_json(r#""Stop""#).is_ok());
        assert!(NavCmd::from_json(r#"{"Jump": 3}"#).is_err());
    }
}
