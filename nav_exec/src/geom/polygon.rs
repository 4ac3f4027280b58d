//! Point-in-polygon classification

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Point;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Location of a point relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointLocation {
    Outside,
    Inside,
    OnEdge,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Locate a point relative to a simple polygon.
pub fn locate(p: Point, polygon: &[Point]) -> PointLocation {
    locate_doubled((p.x as i64 * 2, p.y as i64 * 2), polygon)
}

/// Locate a point given in doubled coordinates relative to a simple polygon.
///
/// Doubled coordinates allow the midpoint of two integer points, `a + b`, to be located exactly.
/// The polygon vertices are doubled internally. Uses the crossing number of a ray cast towards +X,
/// computed in `i128` so that no product can overflow.
pub fn locate_doubled(p2: (i64, i64), polygon: &[Point]) -> PointLocation {
    let (px, py) = (p2.0 as i128, p2.1 as i128);
    let mut inside = false;

    for i in 0..polygon.len() {
        let vi = polygon[i];
        let vj = polygon[(i + 1) % polygon.len()];
        let (xi, yi) = (vi.x as i128 * 2, vi.y as i128 * 2);
        let (xj, yj) = (vj.x as i128 * 2, vj.y as i128 * 2);

        // On the edge
        let cross = (xj - xi) * (py - yi) - (yj - yi) * (px - xi);
        if cross == 0
            && px >= xi.min(xj)
            && px <= xi.max(xj)
            && py >= yi.min(yj)
            && py <= yi.max(yj)
        {
            return PointLocation::OnEdge;
        }

        // Edge straddles the horizontal through p, check the crossing is to the right of p
        if (yi > py) != (yj > py) {
            let lhs = (px - xi) * (yj - yi);
            let rhs = (xj - xi) * (py - yi);
            let crosses = if yj > yi { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }
    }

    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
