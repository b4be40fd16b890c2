use serde::Serialize;

use crate::errors::{Error, Result};
use crate::graph::{GraphModel, Vertex, VertexId};
use crate::route::Route;

/// Fuel level below which the tank counts as empty
pub const MIN_FUEL: f64 = 1.0;


/// Fuel carried along a route.
///
/// Owned by whoever starts a tour and threaded through every leg; entering a
/// vertex burns its `cost` and then adds its `fuel_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelTank {
    level: f64,
}

impl FuelTank {

    pub fn new(budget: f64) -> Self {
        Self { level: budget }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// An empty tank cannot start a search at all
    pub fn has_fuel(&self) -> bool {
        self.level > 0.0
    }

    /// Burn/refuel for entering `vertex`; returns the net change.
    pub fn enter(&mut self, vertex: &Vertex) -> f64 {
        let change = vertex.fuel_delta - vertex.cost;
        self.level -= vertex.cost;
        self.level += vertex.fuel_delta;
        change
    }

    pub fn is_exhausted(&self) -> bool {
        self.level < MIN_FUEL
    }

    /// Drive `route` from its first vertex, entering every later one.
    ///
    /// On success the tank holds what is left. If the level drops below
    /// [`MIN_FUEL`] the tank is left untouched and `ResourceExhausted` names
    /// the vertex where it ran dry.
    pub fn replay(&mut self, route: &Route, graph: &GraphModel) -> Result<f64> {
        let (Some(origin), Some(destination)) = (route.origin(), route.destination()) else {
            return Ok(self.level);
        };

        if !self.has_fuel() {
            return Err(Error::ResourceExhausted { origin, destination, at: None });
        }

        let mut trial = *self;
        for &id in route.steps().iter().skip(1) {
            let vertex = graph.require(id)?;
            trial.enter(vertex);
            if trial.is_exhausted() {
                return Err(exhausted(origin, destination, id));
            }
        }

        *self = trial;
        Ok(self.level)
    }
}

fn exhausted(origin: VertexId, destination: VertexId, at: VertexId) -> Error {
    tracing::debug!(%origin, %destination, %at, "fuel exhausted during replay");
    Error::ResourceExhausted { origin, destination, at: Some(at) }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridBuilder, GridConfig, GridCoord, parse_map};

    fn line_graph(text: &str) -> GraphModel {
        let grid = parse_map(text).unwrap();
        GridBuilder::new(GridConfig { fuel_gain: 5.0, ..GridConfig::default() })
            .build(&grid, &mut ())
            .unwrap()
    }

    fn straight_route(graph: &GraphModel, cols: usize) -> Route {
        let steps = (0..cols).map(|col| graph.id_of(GridCoord::new(0, col))).collect();
        Route::from_steps(steps, (cols - 1) as f64)
    }

    #[test]
    fn replay_burns_cost_per_entered_vertex() {
        let graph = line_graph("height 1\nwidth 5\n.....\n");
        let mut tank = FuelTank::new(10.0);
        let left = tank.replay(&straight_route(&graph, 5), &graph).unwrap();
        assert_eq!(left, 6.0);
        assert_eq!(tank.level(), 6.0);
    }

    #[test]
    fn fuel_cells_refill() {
        let graph = line_graph("height 1\nwidth 5\n..g..\n");
        let mut tank = FuelTank::new(3.0);
        // 3 -> 2 -> 6 -> 5 -> 4
        assert_eq!(tank.replay(&straight_route(&graph, 5), &graph).unwrap(), 4.0);
    }

    #[test]
    fn running_dry_reports_vertex_and_keeps_level() {
        let graph = line_graph("height 1\nwidth 5\n.....\n");
        let mut tank = FuelTank::new(3.0);
        let err = tank.replay(&straight_route(&graph, 5), &graph).unwrap_err();
        // 3 -> 2 -> 1 -> 0: third step is below the threshold
        let expected = graph.id_of(GridCoord::new(0, 3));
        assert!(matches!(err, Error::ResourceExhausted { at: Some(at), .. } if at == expected));
        assert_eq!(tank.level(), 3.0);
    }

    #[test]
    fn non_positive_budget_fails_up_front() {
        let graph = line_graph("height 1\nwidth 2\n..\n");
        let mut tank = FuelTank::new(0.0);
        assert!(matches!(
            tank.replay(&straight_route(&graph, 2), &graph),
            Err(Error::ResourceExhausted { at: None, .. })
        ));
    }
}
