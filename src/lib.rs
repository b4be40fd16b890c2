//! Fuel-constrained routing on grid maps.
//!
//! A map is decoded into a [`CellGrid`], turned into a [`GraphModel`] by the
//! [`GridBuilder`], and searched with [`AStar`]. [`RouteSolver`] orders the
//! mandatory stations of the map into the cheapest tour the fuel budget
//! allows, and [`PathSmoother`] can straighten the result for display.
//!
//! ```no_run
//! use fuelroute::{GridBuilder, GridConfig, Heuristic, MapMarkers, RouteSolver, SolverConfig};
//!
//! # fn main() -> fuelroute::Result<()> {
//! let grid = fuelroute::load_map("level.txt")?;
//! let mut markers = MapMarkers::default();
//! let graph = GridBuilder::new(GridConfig::default()).build(&grid, &mut markers)?;
//! let (Some((entry, _)), Some((exit, _))) = (markers.entry, markers.exit) else {
//!     return Ok(());
//! };
//!
//! let plan = RouteSolver::new(&graph, SolverConfig::default())
//!     .solve(graph.id_of(entry), graph.id_of(exit), 50.0, Heuristic::Manhattan.as_fn())?;
//! println!("{} steps, cost {}", plan.route.len(), plan.route.cost());
//! # Ok(())
//! # }
//! ```

pub mod collections;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod graph_algos;
pub mod grid;
pub mod resource;
pub mod route;
pub mod spatial;

pub use collections::{Keyed, PriorityQueue};
pub use config::PlannerConfig;
pub use errors::{ConstructionError, Error, InfeasibleReason, Result};
pub use geometry::{Heuristic, Point};
pub use graph::{GraphModel, Vertex, VertexId};
pub use graph_algos::{
    AStar, GridSight, LineOfSight, PathSmoother, RouteSolver, SolveMode, SolverConfig, TourPlan, cheapest_costs, dijkstra_route,
};
pub use grid::{
    CellGrid, CellType, GridBuilder, GridConfig, GridCoord, GridEnvironment, MapMarkers, Neighborhood, load_map,
    parse_map,
};
pub use resource::{FuelTank, MIN_FUEL};
pub use route::{Route, RouteStep};
pub use spatial::SpatialIndex;
