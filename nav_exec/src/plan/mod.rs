//! # Path planner
//!
//! Plans the shortest obstacle-free path between two points of the playground:
//!
//! 1. Build the visibility graph of the start, the goal and every obstacle vertex
//!    ([`vis_graph`]),
//! 2. Solve for the shortest path over the graph ([`dijkstra`]),
//! 3. Convert the path into waypoints for the executor ([`waypoints`]).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod dijkstra;
mod params;
pub mod vis_graph;
pub mod waypoints;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use serde::Serialize;

pub use dijkstra::{solve, Solution, MAX_CHECKPOINTS};
pub use params::PlannerParams;
pub use vis_graph::VisGraph;

use crate::{
    geom::{Playground, Point},
    obstacle::ObstacleModel,
};
use vis_graph::{GOAL_NODE, START_NODE};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Plans paths across the playground.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    params: PlannerParams,
    playground: Playground,
}

/// Diagnostics of a single plan, saved into the session.
#[derive(Debug, Clone, Serialize)]
pub struct PlannerReport {
    pub start: Point,
    pub goal: Point,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_degenerate: usize,
    pub result: Result<Solution, PlanError>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum PlanError {
    #[error("The visibility graph has more than {0} edges")]
    CapacityExceeded(usize),

    #[error("No path to the goal")]
    NoPath,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Planner {
    pub fn new(params: PlannerParams, playground: Playground) -> Self {
        Self { params, playground }
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    /// Plan the shortest path from `start` to `goal` around the obstacles.
    pub fn plan(
        &self,
        obstacles: &ObstacleModel,
        start: Point,
        goal: Point,
    ) -> Result<Solution, PlanError> {
        let graph = match VisGraph::build(
            obstacles,
            &self.playground,
            start,
            goal,
            self.params.max_edges,
        ) {
            Ok(g) => g,
            Err(e) => {
                self.save_report(PlannerReport {
                    start,
                    goal,
                    num_nodes: obstacles.num_points() + 2,
                    num_edges: 0,
                    num_degenerate: 0,
                    result: Err(e),
                });
                return Err(e);
            }
        };

        debug!(
            "Visibility graph built: {} nodes, {} edges, {} degenerate",
            graph.num_nodes(),
            graph.num_edges(),
            graph.num_degenerate
        );

        let result = solve(&graph, START_NODE, GOAL_NODE);

        match result {
            Ok(ref sol) => info!(
                "Path from {:?} to {:?}: {} checkpoints, {} mm",
                start,
                goal,
                sol.checkpoints.len(),
                sol.length_mm
            ),
            Err(ref e) => info!("No path from {:?} to {:?}: {}", start, goal, e),
        }

        self.save_report(PlannerReport {
            start,
            goal,
            num_nodes: graph.num_nodes(),
            num_edges: graph.num_edges(),
            num_degenerate: graph.num_degenerate,
            result: result.clone(),
        });

        result
    }

    fn save_report(&self, report: PlannerReport) {
        if self.params.save_reports {
            util::session::save_with_timestamp("planner/report.json", report);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::square;
    use comms_if::wp::SpeedProfile;

    #[test]
    fn test_planner() {
        let params: PlannerParams = util::params::from_str(
            r#"
            speed = "Normal"
            save_reports = true
            "#,
        )
        .unwrap();
        assert_eq!(params.max_edges, 2048);
        assert_eq!(params.speed, SpeedProfile::Normal);

        let planner = Planner::new(
            params,
            Playground {
                width_mm: 3000,
                height_mm: 2000,
            },
        );

        let mut model = ObstacleModel::new();
        model
            .set_polygon(0, &square(Point::new(1500, 1000), 200))
            .unwrap();

        let sol = planner
            .plan(&model, Point::new(500, 1000), Point::new(2500, 1000))
            .unwrap();
        assert_eq!(sol.checkpoints.len(), 3);

        // Goal on the playground border
        assert_eq!(
            planner.plan(&model, Point::new(500, 1000), Point::new(3000, 1000)),
            Err(PlanError::NoPath)
        );
    }
}
