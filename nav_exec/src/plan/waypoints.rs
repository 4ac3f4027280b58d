//! Conversion of solved paths into waypoints for the executor

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::wp::{SpeedProfile, Waypoint};

use crate::geom::Point;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert checkpoints into `GotoAuto` waypoints.
///
/// The executor may blend through intermediate checkpoints, only the last waypoint must finish.
pub fn from_checkpoints(checkpoints: &[Point], speed: SpeedProfile) -> Vec<Waypoint> {
    let last = checkpoints.len().saturating_sub(1);

    checkpoints
        .iter()
        .enumerate()
        .map(|(i, cp)| Waypoint::goto(*cp, speed, i == last))
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::wp::{MotionType, WpTarget};

    #[test]
    fn test_from_checkpoints() {
        let cps = [Point::new(1300, 800), Point::new(1700, 800), Point::new(2500, 1000)];

        let wps = from_checkpoints(&cps, SpeedProfile::Slow);

        assert_eq!(wps.len(), 3);
        assert!(wps.iter().all(|w| w.motion == MotionType::GotoAuto));
        assert!(wps.iter().all(|w| w.speed == SpeedProfile::Slow));
        assert!(wps.iter().all(|w| w.offset == Point::default()));
        assert_eq!(
            wps.iter().map(|w| w.must_finish).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(wps[1].target, WpTarget::Absolute(Point::new(1700, 800)));

        assert!(from_checkpoints(&[], SpeedProfile::Fast).is_empty());
    }
}
