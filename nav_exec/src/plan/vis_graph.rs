//! # Visibility graph builder
//!
//! Builds the graph of mutually visible points among the start, the goal, and every obstacle
//! vertex. Node 0 is always the start and node 1 the goal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};
use serde::Serialize;
use util::maths::int_norm;

use super::PlanError;
use crate::{
    geom::{locate_doubled, Crossing, Playground, Point, PointLocation, Segment},
    obstacle::ObstacleModel,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

pub const START_NODE: usize = 0;
pub const GOAL_NODE: usize = 1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A node of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub point: Point,

    /// Id of the polygon this vertex belongs to, `None` for the start and goal
    pub polygon: Option<usize>,

    /// Index of the vertex within its polygon
    pub point_idx: usize,
}

/// A directed edge to a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub to: usize,

    /// Euclidean length of the edge rounded to the nearest millimetre
    pub weight_mm: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VisGraph {
    pub nodes: Vec<GraphNode>,

    /// Outgoing edges of each node. Each visible pair is stored in both directions.
    adjacency: Vec<Vec<Edge>>,

    /// Number of undirected edges
    num_edges: usize,

    /// Number of segment pairs which could not be classified
    pub num_degenerate: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VisGraph {
    /// Build the visibility graph.
    ///
    /// A pair of points is connected if both lie strictly inside the playground, the segment
    /// between them does not properly cross any polygon edge, and no part of it passes through the
    /// inside of a polygon. Segments touching a vertex or running along an edge are visible.
    pub fn build(
        obstacles: &ObstacleModel,
        playground: &Playground,
        start: Point,
        goal: Point,
        max_edges: usize,
    ) -> Result<Self, PlanError> {
        let polygons: Vec<(usize, &[Point])> = obstacles.polygons().collect();

        // Gather nodes, start and goal first
        let mut nodes = vec![
            GraphNode {
                point: start,
                polygon: None,
                point_idx: 0,
            },
            GraphNode {
                point: goal,
                polygon: None,
                point_idx: 0,
            },
        ];
        for (id, points) in polygons.iter() {
            nodes.extend(points.iter().enumerate().map(|(i, p)| GraphNode {
                point: *p,
                polygon: Some(*id),
                point_idx: i,
            }));
        }

        let mut graph = VisGraph {
            adjacency: vec![Vec::new(); nodes.len()],
            nodes,
            num_edges: 0,
            num_degenerate: 0,
        };

        let usable: Vec<bool> = graph
            .nodes
            .iter()
            .map(|n| playground.contains(n.point))
            .collect();

        for i in 0..graph.nodes.len() {
            if !usable[i] {
                continue;
            }

            for j in (i + 1)..graph.nodes.len() {
                if !usable[j] {
                    continue;
                }

                let (p, q) = (graph.nodes[i].point, graph.nodes[j].point);
                let seg = Segment::new(p, q);

                if !graph.is_visible(&seg, &polygons) {
                    continue;
                }

                graph.num_edges += 1;
                if graph.num_edges > max_edges {
                    warn!(
                        "Visibility graph exceeds its capacity of {} edges ({} nodes)",
                        max_edges,
                        graph.nodes.len()
                    );
                    return Err(PlanError::CapacityExceeded(max_edges));
                }

                let weight_mm = int_norm(q.x as i64 - p.x as i64, q.y as i64 - p.y as i64);
                graph.adjacency[i].push(Edge { to: j, weight_mm });
                graph.adjacency[j].push(Edge { to: i, weight_mm });

                trace!("Edge {} -> {} ({:?} -> {:?}), {} mm", i, j, p, q, weight_mm);
            }
        }

        Ok(graph)
    }

    /// Outgoing edges of a node.
    pub fn neighbours(&self, node: usize) -> &[Edge] {
        self.adjacency.get(node).map(|a| a.as_slice()).unwrap_or(&[])
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Check the segment against every polygon.
    fn is_visible(&mut self, seg: &Segment, polygons: &[(usize, &[Point])]) -> bool {
        for (id, points) in polygons.iter() {
            for k in 0..points.len() {
                let edge = Segment::new(points[k], points[(k + 1) % points.len()]);

                match seg.classify(&edge) {
                    Ok(Crossing::Cross) => return false,
                    Ok(_) => (),
                    Err(e) => {
                        warn!("DegenerateGeometry against polygon {}: {}", id, e);
                        self.num_degenerate += 1;
                    }
                }
            }

            if passes_inside(seg, points) {
                return false;
            }
        }

        true
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// True if some part of the segment lies inside the polygon.
///
/// The segment is split at every point where it touches the polygon (its own endpoints, and any
/// polygon vertex lying on it). Since the segment does not properly cross an edge, each piece is
/// either entirely inside or entirely outside, which is decided by its midpoint.
fn passes_inside(seg: &Segment, polygon: &[Point]) -> bool {
    let mut contacts: Vec<Point> = Vec::with_capacity(polygon.len() + 2);
    contacts.push(seg.start);
    contacts.push(seg.end);
    contacts.extend(polygon.iter().copied().filter(|v| seg.contains(*v)));

    contacts.sort_by_key(|p| seg.projection(*p));
    contacts.dedup();

    contacts.windows(2).any(|w| {
        let mid2 = (
            w[0].x as i64 + w[1].x as i64,
            w[0].y as i64 + w[1].y as i64,
        );
        locate_doubled(mid2, polygon) == PointLocation::Inside
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::square;

    const PLAYGROUND: Playground = Playground {
        width_mm: 3000,
        height_mm: 2000,
    };

    fn has_edge(graph: &VisGraph, a: usize, b: usize) -> bool {
        graph.neighbours(a).iter().any(|e| e.to == b)
    }

    #[test]
    fn test_empty_model() {
        let model = ObstacleModel::new();

        let graph = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(100, 100),
            Point::new(400, 500),
            2048,
        )
        .unwrap();

        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.neighbours(START_NODE)[0].weight_mm, 500);
        assert!(has_edge(&graph, GOAL_NODE, START_NODE));
    }

    #[test]
    fn test_square_edges_and_diagonals() {
        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 200))
            .unwrap();

        let graph = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(500, 1000),
            Point::new(2500, 1000),
            2048,
        )
        .unwrap();

        // Square vertices are nodes 2..6, counter-clockwise from bottom left
        assert!(has_edge(&graph, 2, 3));
        assert!(has_edge(&graph, 3, 4));
        assert!(has_edge(&graph, 5, 2));

        // Diagonals go through the inside
        assert!(!has_edge(&graph, 2, 4));
        assert!(!has_edge(&graph, 3, 5));

        // Straight line from start to goal goes through the square
        assert!(!has_edge(&graph, START_NODE, GOAL_NODE));

        // Start sees the two left corners only
        assert!(has_edge(&graph, START_NODE, 2));
        assert!(has_edge(&graph, START_NODE, 5));
        assert!(!has_edge(&graph, START_NODE, 3));
        assert!(!has_edge(&graph, START_NODE, 4));
    }

    #[test]
    fn test_path_along_edge_is_visible() {
        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 200))
            .unwrap();

        // Start and goal lie on the extension of the square's bottom edge
        let graph = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(1000, 800),
            Point::new(2000, 800),
            2048,
        )
        .unwrap();

        assert!(has_edge(&graph, START_NODE, GOAL_NODE));
    }

    #[test]
    fn test_through_two_vertices_is_blocked() {
        // Diamond with a horizontal diagonal between its left and right vertices
        let mut model = ObstacleModel::new();
        model
            .set_polygon(
                0,
                &[
                    Point::new(1300, 1000),
                    Point::new(1500, 800),
                    Point::new(1700, 1000),
                    Point::new(1500, 1200),
                ],
            )
            .unwrap();

        let graph = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(1000, 1000),
            Point::new(2000, 1000),
            2048,
        )
        .unwrap();

        // Touching a vertex from outside is fine, running through the diamond isn't
        assert!(has_edge(&graph, START_NODE, 2));
        assert!(!has_edge(&graph, START_NODE, GOAL_NODE));
        assert!(!has_edge(&graph, START_NODE, 4));
    }

    #[test]
    fn test_outside_playground_rejected() {
        let mut model = ObstacleModel::new();
        // Square touching the border, its left vertices sit on x = 0
        model.set_polygon(0, &square(Point::new(100, 1000), 100)).unwrap();

        let graph = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(0, 500),
            Point::new(1000, 500),
            2048,
        )
        .unwrap();

        assert!(graph.neighbours(START_NODE).is_empty());
        assert!(graph.neighbours(2).is_empty());
        assert!(graph.neighbours(5).is_empty());
        assert!(has_edge(&graph, GOAL_NODE, 3));
    }

    #[test]
    fn test_edge_capacity() {
        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 200))
            .unwrap();

        let res = VisGraph::build(
            &model,
            &PLAYGROUND,
            Point::new(500, 1000),
            Point::new(2500, 1000),
            3,
        );

        assert!(matches!(res, Err(PlanError::CapacityExceeded(3))));
    }
}
