use crate::collections::{Cost, Keyed, PriorityQueue};
use crate::errors::{Error, Result};
use crate::geometry::Point;
use crate::graph::{GraphModel, VertexId};
use crate::resource::FuelTank;
use crate::route::Route;
use super::shortest_path::trace_back;

use std::cmp::Ordering;
use num_traits::Zero;
use tracing::debug;


/// Search record on the A* frontier.
///
/// Identity is the vertex ([`Keyed`]); ordering is the estimated total cost.
/// A vertex therefore has at most one record per queue, and pushing a cheaper
/// record replaces the old one.
#[derive(Debug, Clone, Copy)]
struct Node {
    vertex: VertexId,
    previous: Option<usize>, // index of the parent in the expanded records
    cost_so_far: Cost, // confirmed cost from the origin
    estimated_total: Cost, // cost_so_far + h(n)
}

impl Keyed for Node {
    type Key = VertexId;

    fn key(&self) -> VertexId {
        self.vertex
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.estimated_total.cmp(&other.estimated_total)
    }
}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_total == other.estimated_total
    }
}
impl Eq for Node {}


/// A* Algorithm over a [`GraphModel`]
/// https://en.wikipedia.org/wiki/A*_search_algorithm
///
/// Moving onto a vertex costs that vertex's `cost`. The heuristic receives the
/// world positions of a vertex and of the destination; it must never
/// overestimate for the returned route to be optimal, which is not checked.
/// Equal estimates are expanded in the order they were first queued.
pub struct AStar<'g> {
    graph: &'g GraphModel,
}

impl<'g> AStar<'g> {

    pub fn new(graph: &'g GraphModel) -> Self {
        Self { graph }
    }

    /// Cheapest route from `origin` to `destination`, ignoring fuel
    pub fn find_path<H>(&self, origin: VertexId, destination: VertexId, heuristic: H) -> Result<Route>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        let goal = self.graph.require(destination)?.position;
        let start = self.graph.require(origin)?;

        // Open list: frontier, lowest estimated total first
        let mut open: PriorityQueue<Node> = PriorityQueue::new();
        // Closed list: expanded records, re-opened if a cheaper path turns up
        let mut closed: PriorityQueue<Node> = PriorityQueue::new();
        // Every expanded record, parents are indices into this
        let mut expanded: Vec<Node> = Vec::new();

        open.push(Node {
            vertex: origin,
            previous: None,
            cost_so_far: Zero::zero(),
            estimated_total: Cost(heuristic(&start.position, &goal)),
        });

        while let Some(current) = open.pop() {
            let current_index = expanded.len();
            expanded.push(current);

            if current.vertex == destination {
                let steps = trace_back(current_index, |index| {
                    expanded.get(index).map(|node| (node.vertex, node.previous))
                })
                .ok_or(Error::NotFound { origin, destination })?;

                debug!(%origin, %destination, expanded = expanded.len(), cost = current.cost_so_far.value(), "a* found path");
                return Ok(Route::from_steps(steps, current.cost_so_far.value()));
            }

            for neighbour in self.graph.neighbours(current.vertex) {
                let cost_so_far = current.cost_so_far + Cost(neighbour.cost);

                // reuse h = f - g from an existing record when there is one
                let remaining = if let Some(record) = closed.find_key(&neighbour.id).copied() {
                    if record.cost_so_far <= cost_so_far {
                        continue;
                    }
                    closed.remove_key(&neighbour.id);
                    record.estimated_total - record.cost_so_far
                } else if let Some(record) = open.find_key(&neighbour.id) {
                    if record.cost_so_far <= cost_so_far {
                        continue;
                    }
                    record.estimated_total - record.cost_so_far
                } else {
                    Cost(heuristic(&neighbour.position, &goal))
                };

                // replaces any open record for this vertex
                open.push(Node {
                    vertex: neighbour.id,
                    previous: Some(current_index),
                    cost_so_far,
                    estimated_total: cost_so_far + remaining,
                });
            }

            closed.push(current);
        }

        debug!(%origin, %destination, expanded = expanded.len(), "a* exhausted open list");
        Err(Error::NotFound { origin, destination })
    }

    /// Cheapest route, then checked against `tank`.
    ///
    /// The search itself ignores fuel; the found route is replayed through the
    /// tank afterwards. The route can therefore fail with `ResourceExhausted`
    /// even when a dearer route that refuels on the way would have made it.
    /// On success the tank holds the fuel left at the destination; on failure
    /// it is unchanged.
    pub fn find_path_with_tank<H>(
        &self,
        origin: VertexId,
        destination: VertexId,
        tank: &mut FuelTank,
        heuristic: H,
    ) -> Result<Route>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        if !tank.has_fuel() {
            return Err(Error::ResourceExhausted { origin, destination, at: None });
        }

        let route = self.find_path(origin, destination, heuristic)?;
        tank.replay(&route, self.graph)?;
        Ok(route)
    }

    /// Fuel-checked route starting with `budget`; returns the fuel left.
    pub fn find_path_with_fuel<H>(
        &self,
        origin: VertexId,
        destination: VertexId,
        budget: f64,
        heuristic: H,
    ) -> Result<(Route, f64)>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        let mut tank = FuelTank::new(budget);
        let route = self.find_path_with_tank(origin, destination, &mut tank, heuristic)?;
        Ok((route, tank.level()))
    }
}
