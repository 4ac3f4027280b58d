//! # Obstacle model
//!
//! Holds every polygonal obstacle on the playground. Points of all polygons live in a single
//! fixed-capacity arena, polygons reference their slice of the arena by offset and count.
//!
//! Polygon ids below [`FIRST_DYNAMIC_ID`] are for static obstacles. They are loaded at startup,
//! after which the model is frozen and the static polygons can no longer change. The last three
//! ids are reserved for the dynamic obstacles (the teammate and the two opponents), which are
//! rewritten every cycle by the avoidance. Dynamic obstacles are never removed: when their
//! position is unknown they are parked as a square outside the playground.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use serde::Serialize;

use crate::geom::Point;
pub use params::{DynamicParams, StaticObstacles, StaticPolygon};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of polygons in the model.
pub const MAX_POLYGONS: usize = 16;

/// Maximum number of points across all polygons.
pub const MAX_POINTS: usize = 100;

/// Minimum number of points in a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Id of the first dynamic polygon, all ids from this one are reserved.
pub const FIRST_DYNAMIC_ID: usize = MAX_POLYGONS - DynamicSlot::ALL.len();

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Reference to a polygon's points within the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct PolygonRef {
    offset: usize,
    count: usize,
}

#[derive(Debug, Clone)]
pub struct ObstacleModel {
    /// Point arena, shared by all polygons
    points: Vec<Point>,

    polygons: [Option<PolygonRef>; MAX_POLYGONS],

    /// Polygons which were set when the model was frozen
    is_static: [bool; MAX_POLYGONS],

    /// Incremented every time the content of a polygon changes
    revision: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The reserved dynamic obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DynamicSlot {
    Teammate,
    Opponent1,
    Opponent2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ObstacleError {
    #[error("Polygon id {0} is beyond the polygon capacity")]
    PolygonCapacityExceeded(usize),

    #[error("Storing {requested} points would take the arena to {total} points")]
    PointCapacityExceeded { requested: usize, total: usize },

    #[error("A polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("Polygon {0} is static and cannot be modified once the model is frozen")]
    StaticPolygon(usize),

    #[error("Too many static polygons ({0}), the last three ids are reserved")]
    TooManyStatic(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DynamicSlot {
    pub const ALL: [DynamicSlot; 3] = [
        DynamicSlot::Teammate,
        DynamicSlot::Opponent1,
        DynamicSlot::Opponent2,
    ];

    /// Polygon id of this slot.
    pub fn id(self) -> usize {
        MAX_POLYGONS - Self::ALL.len() + self as usize
    }

    /// Slot of the given opponent, `None` if the index is out of range.
    pub fn opponent(index: usize) -> Option<Self> {
        match index {
            0 => Some(DynamicSlot::Opponent1),
            1 => Some(DynamicSlot::Opponent2),
            _ => None,
        }
    }
}

impl ObstacleError {
    /// True if the error comes from a capacity limit of the model.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            ObstacleError::PolygonCapacityExceeded(_)
                | ObstacleError::PointCapacityExceeded { .. }
                | ObstacleError::TooManyStatic(_)
        )
    }
}

impl Default for ObstacleModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleModel {
    /// Create an empty, unfrozen model.
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(MAX_POINTS),
            polygons: [None; MAX_POLYGONS],
            is_static: [false; MAX_POLYGONS],
            revision: 0,
        }
    }

    /// Store the static obstacles with ids starting at 0, then freeze the model.
    pub fn load_static(&mut self, obstacles: &StaticObstacles) -> Result<(), ObstacleError> {
        if obstacles.polygons.len() > FIRST_DYNAMIC_ID {
            return Err(ObstacleError::TooManyStatic(obstacles.polygons.len()));
        }

        for (id, poly) in obstacles.polygons.iter().enumerate() {
            self.set_polygon(id, &poly.points)?;
            debug!(
                "Static obstacle {} \"{}\" loaded with {} points",
                id,
                poly.name,
                poly.points.len()
            );
        }

        self.freeze();

        info!(
            "{} static obstacles loaded, {} points in use",
            obstacles.polygons.len(),
            self.num_points()
        );

        Ok(())
    }

    /// Mark every polygon currently stored as static.
    pub fn freeze(&mut self) {
        for (id, poly) in self.polygons.iter().enumerate() {
            if poly.is_some() {
                self.is_static[id] = true;
            }
        }
    }

    /// Store or replace a polygon.
    ///
    /// A replacement with the same number of points is written in place. Otherwise the old points
    /// are removed from the arena, which is compacted, and the new points are appended. On error
    /// the model is left unchanged.
    pub fn set_polygon(&mut self, id: usize, points: &[Point]) -> Result<(), ObstacleError> {
        if id >= MAX_POLYGONS {
            return Err(ObstacleError::PolygonCapacityExceeded(id));
        }
        if self.is_static[id] {
            return Err(ObstacleError::StaticPolygon(id));
        }
        if points.len() < MIN_POLYGON_POINTS {
            return Err(ObstacleError::TooFewPoints(points.len()));
        }

        let old_count = self.polygons[id].map(|p| p.count).unwrap_or(0);
        let total = self.points.len() - old_count + points.len();
        if total > MAX_POINTS {
            return Err(ObstacleError::PointCapacityExceeded {
                requested: points.len(),
                total,
            });
        }

        match self.polygons[id] {
            Some(poly) if poly.count == points.len() => {
                let stored = &mut self.points[poly.offset..poly.offset + poly.count];
                if *stored == *points {
                    return Ok(());
                }
                stored.copy_from_slice(points);
            }
            _ => {
                self.remove_from_arena(id);
                self.polygons[id] = Some(PolygonRef {
                    offset: self.points.len(),
                    count: points.len(),
                });
                self.points.extend_from_slice(points);
            }
        }

        self.revision += 1;

        Ok(())
    }

    /// Draw a square dynamic obstacle centred on the given point.
    pub fn set_dynamic(
        &mut self,
        slot: DynamicSlot,
        centre: Point,
        half_size_mm: i32,
    ) -> Result<(), ObstacleError> {
        self.set_polygon(slot.id(), &square(centre, half_size_mm))
    }

    /// Park a dynamic obstacle outside the playground.
    pub fn park(&mut self, slot: DynamicSlot, params: &DynamicParams) -> Result<(), ObstacleError> {
        let half_size_mm = match slot {
            DynamicSlot::Teammate => params.teammate_half_size_mm,
            _ => params.opponent_half_size_mm,
        };
        self.set_dynamic(slot, params.park_position, half_size_mm)
    }

    /// Points of a polygon, `None` if no polygon has this id.
    pub fn polygon(&self, id: usize) -> Option<&[Point]> {
        self.polygons
            .get(id)
            .copied()
            .flatten()
            .map(|p| &self.points[p.offset..p.offset + p.count])
    }

    /// Iterate over all stored polygons as `(id, points)`, in id order.
    pub fn polygons(&self) -> impl Iterator<Item = (usize, &[Point])> + '_ {
        (0..MAX_POLYGONS).filter_map(move |id| self.polygon(id).map(|pts| (id, pts)))
    }

    pub fn is_static(&self, id: usize) -> bool {
        self.is_static.get(id).copied().unwrap_or(false)
    }

    pub fn num_polygons(&self) -> usize {
        self.polygons.iter().filter(|p| p.is_some()).count()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Revision of the model's content. Rewriting a polygon with identical points does not change
    /// it, so an unchanged revision means an unchanged set of obstacles.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Remove a polygon's points from the arena, shifting the points of every polygon stored after
    /// it down to close the gap.
    fn remove_from_arena(&mut self, id: usize) {
        let removed = match self.polygons[id].take() {
            Some(r) => r,
            None => return,
        };

        self.points.drain(removed.offset..removed.offset + removed.count);

        for poly in self.polygons.iter_mut().flatten() {
            if poly.offset > removed.offset {
                poly.offset -= removed.count;
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Axis aligned square around a centre point, counter-clockwise.
pub fn square(centre: Point, half_size_mm: i32) -> [Point; 4] {
    let (x, y, h) = (centre.x, centre.y, half_size_mm);
    [
        Point::new(x - h, y - h),
        Point::new(x + h, y - h),
        Point::new(x + h, y + h),
        Point::new(x - h, y + h),
    ]
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
