//! # Shortest path solver
//!
//! Dijkstra's algorithm over the visibility graph. The graph is small (at most a hundred or so
//! nodes) so the next node is found with a linear scan rather than a priority queue, which keeps
//! the tie-breaking rule simple: among equal distances the node discovered first wins.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use serde::Serialize;

use super::{vis_graph::VisGraph, PlanError};
use crate::geom::Point;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of checkpoints in a path, the goal included.
pub const MAX_CHECKPOINTS: usize = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Planning state of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcPoint {
    pub point: Point,

    /// Shortest distance from the start found so far
    pub weight: u32,

    pub polygon: Option<usize>,

    pub point_idx: usize,

    pub status: Visit,

    /// Node through which the shortest distance was found
    parent: Option<usize>,

    /// Order in which the node entered the frontier
    discovered: usize,
}

/// A solved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// The points to travel through after the start, ending with the goal.
    pub checkpoints: Vec<Point>,

    /// Total length of the path in millimetres
    pub length_mm: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visit {
    NotVisited,

    /// On the frontier
    MustVisit,

    /// Shortest distance is final
    Visited,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the shortest path between two nodes of the graph.
///
/// Fails with `NoPath` if the goal cannot be reached, or if reaching it needs more than
/// [`MAX_CHECKPOINTS`] checkpoints.
pub fn solve(graph: &VisGraph, start: usize, goal: usize) -> Result<Solution, PlanError> {
    if start >= graph.num_nodes() || goal >= graph.num_nodes() {
        return Err(PlanError::NoPath);
    }

    let mut procs: Vec<ProcPoint> = graph
        .nodes
        .iter()
        .map(|n| ProcPoint {
            point: n.point,
            weight: u32::MAX,
            polygon: n.polygon,
            point_idx: n.point_idx,
            status: Visit::NotVisited,
            parent: None,
            discovered: usize::MAX,
        })
        .collect();

    procs[start].weight = 0;
    procs[start].status = Visit::MustVisit;
    procs[start].discovered = 0;
    let mut num_discovered = 1;

    loop {
        // Closest frontier node, earliest discovered on ties
        let current = procs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == Visit::MustVisit)
            .min_by_key(|(_, p)| (p.weight, p.discovered))
            .map(|(i, _)| i);

        let current = match current {
            Some(c) => c,
            None => {
                debug!("Frontier empty before reaching the goal, no path");
                return Err(PlanError::NoPath);
            }
        };

        procs[current].status = Visit::Visited;
        if current == goal {
            break;
        }

        let current_weight = procs[current].weight;
        for edge in graph.neighbours(current) {
            let next = &mut procs[edge.to];
            if next.status == Visit::Visited {
                continue;
            }

            let weight = current_weight.saturating_add(edge.weight_mm);
            if weight < next.weight {
                next.weight = weight;
                next.parent = Some(current);

                if next.status == Visit::NotVisited {
                    next.status = Visit::MustVisit;
                    next.discovered = num_discovered;
                    num_discovered += 1;
                }
            }
        }
    }

    // Walk back from the goal
    let mut checkpoints = Vec::new();
    let mut node = goal;
    while node != start {
        checkpoints.push(procs[node].point);
        node = match procs[node].parent {
            Some(p) => p,
            None => return Err(PlanError::NoPath),
        };
    }
    checkpoints.reverse();

    if checkpoints.len() > MAX_CHECKPOINTS {
        warn!(
            "Shortest path needs {} checkpoints, at most {} are allowed",
            checkpoints.len(),
            MAX_CHECKPOINTS
        );
        return Err(PlanError::NoPath);
    }

    Ok(Solution {
        checkpoints,
        length_mm: procs[goal].weight,
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        geom::{locate_doubled, Crossing, Playground, PointLocation, Segment},
        obstacle::{square, ObstacleModel, MAX_POINTS, MAX_POLYGONS},
        plan::vis_graph::{GOAL_NODE, START_NODE},
    };
    use proptest::prelude::*;

    const PLAYGROUND: Playground = Playground {
        width_mm: 3000,
        height_mm: 2000,
    };

    fn plan(model: &ObstacleModel, start: Point, goal: Point) -> Result<Solution, PlanError> {
        let graph = VisGraph::build(model, &PLAYGROUND, start, goal, 2048).unwrap();
        solve(&graph, START_NODE, GOAL_NODE)
    }

    fn model_of(polygons: &[Vec<Point>]) -> ObstacleModel {
        let mut model = ObstacleModel::new();
        for (id, points) in polygons.iter().enumerate() {
            model.set_polygon(id, points).unwrap();
        }
        model
    }

    fn arb_inside() -> impl Strategy<Value = Point> {
        (1..3000i32, 1..2000i32).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Axis aligned rectangle, possibly hanging over the border.
    fn arb_rect() -> impl Strategy<Value = Vec<Point>> {
        (50..2950i32, 50..1950i32, 20..300i32, 20..300i32).prop_map(|(x, y, hw, hh)| {
            vec![
                Point::new(x - hw, y - hh),
                Point::new(x + hw, y - hh),
                Point::new(x + hw, y + hh),
                Point::new(x - hw, y + hh),
            ]
        })
    }

    /// Regular polygon with rounded vertices.
    fn arb_ring(num_points: usize) -> impl Strategy<Value = Vec<Point>> {
        (200..2800i32, 200..1800i32, 80..250i32, 0.0..1.0f64).prop_map(
            move |(x, y, r, phase)| {
                (0..num_points)
                    .map(|k| {
                        let a = (k as f64 + phase) * std::f64::consts::TAU / num_points as f64;
                        Point::new(
                            x + (r as f64 * a.cos()).round() as i32,
                            y + (r as f64 * a.sin()).round() as i32,
                        )
                    })
                    .collect()
            },
        )
    }

    /// Check a planned path keeps out of every polygon. A leg may touch vertices and run along
    /// edges, but never properly crosses an edge, and no stretch of it between two contacts with
    /// a polygon lies inside that polygon.
    fn check_path(
        start: Point,
        goal: Point,
        res: Result<Solution, PlanError>,
        polygons: &[Vec<Point>],
    ) -> Result<(), TestCaseError> {
        let sol = match res {
            Ok(sol) => sol,
            Err(PlanError::NoPath) => return Ok(()),
            Err(e) => return Err(TestCaseError::fail(format!("unexpected error {:?}", e))),
        };

        prop_assert!(sol.checkpoints.len() <= MAX_CHECKPOINTS);
        prop_assert_eq!(sol.checkpoints.last(), Some(&goal));

        let mut prev = start;
        for cp in sol.checkpoints.iter() {
            let leg = Segment::new(prev, *cp);

            for poly in polygons {
                for k in 0..poly.len() {
                    let edge = Segment::new(poly[k], poly[(k + 1) % poly.len()]);
                    prop_assert_ne!(leg.classify(&edge).unwrap(), Crossing::Cross);
                }

                let mut contacts: Vec<Point> =
                    poly.iter().copied().filter(|v| leg.contains(*v)).collect();
                contacts.push(leg.start);
                contacts.push(leg.end);
                contacts.sort_by_key(|p| leg.projection(*p));
                contacts.dedup();

                for w in contacts.windows(2) {
                    let mid2 = (
                        w[0].x as i64 + w[1].x as i64,
                        w[0].y as i64 + w[1].y as i64,
                    );
                    prop_assert_ne!(
                        locate_doubled(mid2, poly),
                        PointLocation::Inside,
                        "leg {:?} goes through {:?}",
                        leg,
                        poly
                    );
                }
            }

            prev = *cp;
        }

        Ok(())
    }

    #[test]
    fn test_straight_path() {
        let model = ObstacleModel::new();

        let sol = plan(&model, Point::new(200, 200), Point::new(2800, 1800)).unwrap();

        assert_eq!(sol.checkpoints, vec![Point::new(2800, 1800)]);
        assert_eq!(sol.length_mm, 3053);
    }

    #[test]
    fn test_around_rectangle() {
        let mut model = ObstacleModel::new();
        let rect = [
            Point::new(1200, 800),
            Point::new(1800, 800),
            Point::new(1800, 1200),
            Point::new(1200, 1200),
        ];
        model.set_polygon(0, &rect).unwrap();

        let start = Point::new(500, 500);
        let goal = Point::new(2500, 1500);
        let sol = plan(&model, start, goal).unwrap();

        // One corner then the goal
        assert_eq!(sol.checkpoints.len(), 2);
        assert!(rect.contains(&sol.checkpoints[0]));
        assert_eq!(sol.checkpoints[1], goal);

        let straight = util::maths::int_norm(2000, 1000);
        assert!(sol.length_mm >= straight);

        // No leg of the path crosses the rectangle
        let mut prev = start;
        for cp in sol.checkpoints.iter() {
            let leg = Segment::new(prev, *cp);
            for k in 0..rect.len() {
                let edge = Segment::new(rect[k], rect[(k + 1) % rect.len()]);
                assert_ne!(leg.classify(&edge).unwrap(), crate::geom::Crossing::Cross);
            }
            prev = *cp;
        }
    }

    #[test]
    fn test_enclosed_goal_has_no_path() {
        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 300))
            .unwrap();

        let res = plan(&model, Point::new(200, 200), Point::new(1500, 1000));

        assert_eq!(res, Err(PlanError::NoPath));
    }

    /// Thin triangular fences standing alternately on the bottom and top borders. Border points
    /// are outside the playground, so the only way past each fence is round its tip.
    fn fences(n: i32) -> ObstacleModel {
        let mut model = ObstacleModel::new();
        for i in 0..n {
            let x = 300 + i * 250;
            let fence = if i % 2 == 0 {
                [Point::new(x - 10, 0), Point::new(x + 10, 0), Point::new(x, 1700)]
            } else {
                [Point::new(x + 10, 2000), Point::new(x - 10, 2000), Point::new(x, 300)]
            };
            model.set_polygon(i as usize, &fence).unwrap();
        }
        model
    }

    #[test]
    fn test_hop_limit() {
        let start = Point::new(100, 1000);
        let goal = Point::new(2900, 1000);

        // Seven tips and the goal is exactly the limit
        let sol = plan(&fences(7), start, goal).unwrap();
        assert_eq!(sol.checkpoints.len(), MAX_CHECKPOINTS);
        assert_eq!(sol.checkpoints[0], Point::new(300, 1700));
        assert_eq!(sol.checkpoints[1], Point::new(550, 300));
        assert_eq!(sol.checkpoints[MAX_CHECKPOINTS - 1], goal);

        // One more fence needs nine
        assert_eq!(plan(&fences(8), start, goal), Err(PlanError::NoPath));
    }

    #[test]
    fn test_equal_lengths_pick_first_discovered() {
        // Square centred between start and goal, both ways round are the same length
        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 200))
            .unwrap();

        let a = plan(&model, Point::new(500, 1000), Point::new(2500, 1000)).unwrap();
        let b = plan(&model, Point::new(500, 1000), Point::new(2500, 1000)).unwrap();

        assert_eq!(a, b);
        // Bottom left corner (1300, 800) is discovered before the top left one
        assert_eq!(a.checkpoints[0], Point::new(1300, 800));
        assert_eq!(a.checkpoints.len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_path_avoids_rectangles(
            polygons in prop::collection::vec(arb_rect(), 0..=MAX_POLYGONS),
            start in arb_inside(),
            goal in arb_inside(),
        ) {
            prop_assume!(start != goal);

            let model = model_of(&polygons);
            let graph = VisGraph::build(&model, &PLAYGROUND, start, goal, 8192).unwrap();

            check_path(start, goal, solve(&graph, START_NODE, GOAL_NODE), &polygons)?;
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Every polygon slot and every point of the arena in use.
        #[test]
        fn prop_path_avoids_full_arena(
            quads in prop::collection::vec(arb_rect(), 12),
            rings in prop::collection::vec(arb_ring(13), 4),
            start in arb_inside(),
            goal in arb_inside(),
        ) {
            prop_assume!(start != goal);

            let polygons: Vec<Vec<Point>> = quads.into_iter().chain(rings).collect();
            prop_assert_eq!(polygons.len(), MAX_POLYGONS);
            prop_assert_eq!(polygons.iter().map(|p| p.len()).sum::<usize>(), MAX_POINTS);

            let model = model_of(&polygons);
            prop_assert_eq!(model.num_points(), MAX_POINTS);
            let graph = VisGraph::build(&model, &PLAYGROUND, start, goal, 8192).unwrap();

            check_path(start, goal, solve(&graph, START_NODE, GOAL_NODE), &polygons)?;
        }
    }
}
