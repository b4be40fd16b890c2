//! Search and planning over a [`GraphModel`](crate::graph::GraphModel):
//! A* legs, Dijkstra reachability, tour ordering and route smoothing.

pub mod dijkstra;
pub mod a_star;
pub mod route_solver;
pub mod smoothing;
mod shortest_path;

pub use a_star::AStar;
pub use dijkstra::{cheapest_costs, dijkstra_route};
pub use route_solver::{RouteSolver, SolveMode, SolverConfig, TourPlan};
pub use smoothing::{GridSight, LineOfSight, PathSmoother};

use crate::collections::FxIndexMap;

/// Settled nodes of a graph search, in discovery order
/// N: node on the graph
/// C: cost of reaching the node from the start
/// Value is (parent_index, cost); the start node's parent is `NO_PARENT`
pub type GraphNodeMap<N, C> = FxIndexMap<N, (usize, C)>;
