use serde::Serialize;

use crate::errors::Result;
use crate::geometry::Point;
use crate::graph::{GraphModel, VertexId};
use crate::resource::FuelTank;


/// Ordered vertices from origin to destination, with their summed cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    steps: Vec<VertexId>,
    cost: f64,
}

/// One step of a route as the mover sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub vertex: VertexId,
    pub position: Point,
    /// Net fuel change on entering this vertex (zero for the first step)
    pub fuel_change: f64,
    pub fuel_after: f64,
}

impl Route {

    pub fn from_steps(steps: Vec<VertexId>, cost: f64) -> Self {
        Self { steps, cost }
    }

    /// Route that starts and ends at `origin`
    pub fn single(origin: VertexId) -> Self {
        Self { steps: vec![origin], cost: 0.0 }
    }

    pub fn steps(&self) -> &[VertexId] {
        &self.steps
    }

    /// Summed cost of every entered vertex (origin excluded)
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn origin(&self) -> Option<VertexId> {
        self.steps.first().copied()
    }

    pub fn destination(&self) -> Option<VertexId> {
        self.steps.last().copied()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.steps.contains(&id)
    }

    /// Append a leg that starts where this route ends.
    /// The shared vertex is kept once.
    pub fn extend_with(&mut self, leg: &Route) {
        let skip = usize::from(!self.steps.is_empty() && self.destination() == leg.origin());
        self.steps.extend(leg.steps.iter().skip(skip));
        self.cost += leg.cost;
    }

    /// World positions along the route; unknown ids are skipped
    pub fn positions(&self, graph: &GraphModel) -> Vec<Point> {
        self.steps
            .iter()
            .filter_map(|&id| graph.vertex(id))
            .map(|vertex| vertex.position)
            .collect()
    }

    /// Per-step fuel levels, starting from `budget` at the first vertex.
    ///
    /// The trace does not stop when the tank runs low; callers that need the
    /// threshold enforced replay the route through [`FuelTank::replay`].
    pub fn fuel_trace(&self, graph: &GraphModel, budget: f64) -> Result<Vec<RouteStep>> {
        let mut tank = FuelTank::new(budget);
        let mut trace = Vec::with_capacity(self.steps.len());

        for (index, &id) in self.steps.iter().enumerate() {
            let vertex = graph.require(id)?;
            let fuel_change = if index == 0 { 0.0 } else { tank.enter(vertex) };
            trace.push(RouteStep {
                vertex: id,
                position: vertex.position,
                fuel_change,
                fuel_after: tank.level(),
            });
        }

        Ok(trace)
    }
}
