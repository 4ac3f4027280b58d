//! # Geometry
//!
//! Integer geometry primitives used by the obstacle model and the visibility graph builder. All
//! coordinates are whole millimetres on the playground, and every predicate is evaluated exactly in
//! integer arithmetic.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod polygon;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use comms_if::pos::Point;
pub use polygon::{locate, locate_doubled, PointLocation};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum magnitude of any line coefficient.
///
/// Lines with a larger coefficient are degenerate and cannot be used for crossing tests, since the
/// side products could overflow.
pub const LINE_COEFF_CEILING: i64 = 1 << 30;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A line `a*x + b*y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

/// A segment between two points. The segment may have zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// The rectangular playground, with its origin at one corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Playground {
    pub width_mm: i32,
    pub height_mm: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How two segments meet.
///
/// The classification is symmetric: `a.classify(&b) == b.classify(&a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossing {
    /// The segments have no point in common.
    NoCross,

    /// The segments cross at a single point interior to both of them.
    Cross,

    /// The segments meet at a single point which is an endpoint of at least one of them.
    CrossAtEndpoint,

    /// The segments are collinear and overlap along a non-zero length.
    ParallelCross,
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum GeomError {
    #[error("Line through {0:?} has a coefficient above the ceiling")]
    CoeffAboveCeiling(Segment),

    #[error("Side computation overflowed for {0:?}")]
    Overflow(Segment),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Line {
    /// Get the line through two points.
    ///
    /// If both points are equal all coefficients are zero, and every point is on the line.
    pub fn through(seg: &Segment) -> Result<Self, GeomError> {
        let (p, q) = (seg.start, seg.end);

        let a = q.y as i64 - p.y as i64;
        let b = p.x as i64 - q.x as i64;
        let c = (q.x as i64)
            .checked_mul(p.y as i64)
            .and_then(|l| (p.x as i64).checked_mul(q.y as i64).map(|r| (l, r)))
            .and_then(|(l, r)| l.checked_sub(r))
            .ok_or(GeomError::Overflow(*seg))?;

        if a.abs() >= LINE_COEFF_CEILING
            || b.abs() >= LINE_COEFF_CEILING
            || c.abs() >= LINE_COEFF_CEILING
        {
            return Err(GeomError::CoeffAboveCeiling(*seg));
        }

        Ok(Self { a, b, c })
    }

    /// Value of `a*x + b*y + c` at the point. The sign gives the side of the line the point is on.
    pub fn side(&self, p: Point) -> Option<i64> {
        self.a
            .checked_mul(p.x as i64)?
            .checked_add(self.b.checked_mul(p.y as i64)?)?
            .checked_add(self.c)
    }
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// True if the segment has zero length.
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    /// Classify how this segment meets another one.
    ///
    /// Returns an error if either supporting line is degenerate, in which case callers treat the
    /// pair as `NoCross`.
    pub fn classify(&self, other: &Segment) -> Result<Crossing, GeomError> {
        let l1 = Line::through(self)?;
        let l2 = Line::through(other)?;

        let d1 = l2.side(self.start).ok_or(GeomError::Overflow(*self))?;
        let d2 = l2.side(self.end).ok_or(GeomError::Overflow(*self))?;
        let d3 = l1.side(other.start).ok_or(GeomError::Overflow(*other))?;
        let d4 = l1.side(other.end).ok_or(GeomError::Overflow(*other))?;

        // Collinear, or at least one segment is a point lying on the other's line
        if d1 == 0 && d2 == 0 && d3 == 0 && d4 == 0 {
            return Ok(self.collinear_overlap(other));
        }

        if same_side(d1, d2) || same_side(d3, d4) {
            return Ok(Crossing::NoCross);
        }

        if d1 == 0 || d2 == 0 || d3 == 0 || d4 == 0 {
            Ok(Crossing::CrossAtEndpoint)
        } else {
            Ok(Crossing::Cross)
        }
    }

    /// True if the point lies on the segment, endpoints included.
    pub fn contains(&self, p: Point) -> bool {
        let (a, b) = (self.start, self.end);
        let cross = (b.x as i64 - a.x as i64) * (p.y as i64 - a.y as i64)
            - (b.y as i64 - a.y as i64) * (p.x as i64 - a.x as i64);

        cross == 0
            && p.x >= a.x.min(b.x)
            && p.x <= a.x.max(b.x)
            && p.y >= a.y.min(b.y)
            && p.y <= a.y.max(b.y)
    }

    /// Position of the point along the segment, as the dot product of `p - start` with the
    /// segment's direction. Only meaningful for points on the segment.
    pub fn projection(&self, p: Point) -> i64 {
        (p.x as i64 - self.start.x as i64) * (self.end.x as i64 - self.start.x as i64)
            + (p.y as i64 - self.start.y as i64) * (self.end.y as i64 - self.start.y as i64)
    }

    /// Classification of two collinear segments based on the intersection of their bounding boxes.
    fn collinear_overlap(&self, other: &Segment) -> Crossing {
        let x_lo = self.start.x.min(self.end.x).max(other.start.x.min(other.end.x));
        let x_hi = self.start.x.max(self.end.x).min(other.start.x.max(other.end.x));
        let y_lo = self.start.y.min(self.end.y).max(other.start.y.min(other.end.y));
        let y_hi = self.start.y.max(self.end.y).min(other.start.y.max(other.end.y));

        if x_lo > x_hi || y_lo > y_hi {
            Crossing::NoCross
        } else if x_lo == x_hi && y_lo == y_hi {
            Crossing::CrossAtEndpoint
        } else {
            Crossing::ParallelCross
        }
    }
}

impl Playground {
    /// True if the point is strictly inside the playground. Points on the border are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x > 0 && p.x < self.width_mm && p.y > 0 && p.y < self.height_mm
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// True if both values are nonzero and of the same sign.
fn same_side(d1: i64, d2: i64) -> bool {
    d1.signum() * d2.signum() > 0
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn seg(x0: i32, y0: i32, x1: i32, y1: i32) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Classify both ways round, checking the relation is symmetric.
    fn classify(a: Segment, b: Segment) -> Crossing {
        let ab = a.classify(&b).unwrap();
        let ba = b.classify(&a).unwrap();
        assert_eq!(ab, ba, "classification of {:?} and {:?} is not symmetric", a, b);
        ab
    }

    #[test]
    fn test_classify() {
        // Proper crossing
        assert_eq!(classify(seg(0, 0, 10, 10), seg(0, 10, 10, 0)), Crossing::Cross);

        // Disjoint, and disjoint but with crossing supporting lines
        assert_eq!(classify(seg(0, 0, 10, 0), seg(0, 5, 10, 5)), Crossing::NoCross);
        assert_eq!(classify(seg(0, 0, 4, 4), seg(0, 10, 10, 0)), Crossing::NoCross);

        // T junction and shared vertex
        assert_eq!(classify(seg(0, 0, 10, 0), seg(5, 0, 5, 10)), Crossing::CrossAtEndpoint);
        assert_eq!(classify(seg(0, 0, 10, 0), seg(10, 0, 10, 10)), Crossing::CrossAtEndpoint);

        // Collinear: overlapping, touching end to end, and apart
        assert_eq!(classify(seg(0, 0, 10, 0), seg(5, 0, 20, 0)), Crossing::ParallelCross);
        assert_eq!(classify(seg(0, 0, 10, 0), seg(10, 0, 20, 0)), Crossing::CrossAtEndpoint);
        assert_eq!(classify(seg(0, 0, 10, 0), seg(11, 0, 20, 0)), Crossing::NoCross);
        assert_eq!(classify(seg(0, 0, 10, 10), seg(5, 5, 7, 7)), Crossing::ParallelCross);
    }

    #[test]
    fn test_classify_zero_length() {
        // A point on, at the end of, and off a segment
        assert_eq!(classify(seg(5, 0, 5, 0), seg(0, 0, 10, 0)), Crossing::CrossAtEndpoint);
        assert_eq!(classify(seg(0, 0, 0, 0), seg(0, 0, 10, 0)), Crossing::CrossAtEndpoint);
        assert_eq!(classify(seg(5, 1, 5, 1), seg(0, 0, 10, 0)), Crossing::NoCross);
        assert_eq!(classify(seg(20, 0, 20, 0), seg(0, 0, 10, 0)), Crossing::NoCross);

        // Two points
        assert_eq!(classify(seg(3, 3, 3, 3), seg(3, 3, 3, 3)), Crossing::CrossAtEndpoint);
        assert_eq!(classify(seg(3, 3, 3, 3), seg(4, 3, 4, 3)), Crossing::NoCross);
    }

    #[test]
    fn test_degenerate_line() {
        let huge = seg(0, 0, i32::MAX, i32::MAX);

        assert!(Line::through(&huge).is_err());
        assert!(huge.classify(&seg(0, 10, 10, 0)).is_err());
        assert!(seg(0, 10, 10, 0).classify(&huge).is_err());
    }

    #[test]
    fn test_playground_border_is_outside() {
        let pg = Playground {
            width_mm: 3000,
            height_mm: 2000,
        };

        assert!(pg.contains(Point::new(1, 1)));
        assert!(pg.contains(Point::new(2999, 1999)));
        assert!(!pg.contains(Point::new(0, 1000)));
        assert!(!pg.contains(Point::new(1500, 2000)));
        assert!(!pg.contains(Point::new(-10, 500)));
    }

    #[test]
    fn test_segment_contains() {
        let s = seg(0, 0, 10, 20);

        assert!(s.contains(Point::new(5, 10)));
        assert!(s.contains(Point::new(0, 0)));
        assert!(!s.contains(Point::new(15, 30)));
        assert!(!s.contains(Point::new(5, 11)));
    }

    fn arb_segment(span: i32) -> impl Strategy<Value = Segment> {
        (-span..=span, -span..=span, -span..=span, -span..=span)
            .prop_map(|(x0, y0, x1, y1)| seg(x0, y0, x1, y1))
    }

    proptest! {
        #[test]
        fn prop_classify_symmetric(a in arb_segment(4000), b in arb_segment(4000)) {
            prop_assert_eq!(a.classify(&b).unwrap(), b.classify(&a).unwrap());
        }

        /// A small grid makes shared vertices, collinear and zero length pairs common.
        #[test]
        fn prop_classify_symmetric_on_grid(a in arb_segment(3), b in arb_segment(3)) {
            let ab = a.classify(&b).unwrap();
            prop_assert_eq!(ab, b.classify(&a).unwrap());

            // Direction of either segment doesn't matter
            let a_rev = Segment::new(a.end, a.start);
            let b_rev = Segment::new(b.end, b.start);
            prop_assert_eq!(ab, a_rev.classify(&b).unwrap());
            prop_assert_eq!(ab, b_rev.classify(&a_rev).unwrap());
        }
    }
}
