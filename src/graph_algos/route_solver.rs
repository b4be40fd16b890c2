use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collections::FxHashMap;
use crate::errors::{Error, InfeasibleReason, Result};
use crate::geometry::Point;
use crate::graph::{GraphModel, VertexId};
use crate::resource::FuelTank;
use crate::route::Route;
use super::a_star::AStar;
use super::dijkstra::cheapest_costs;


/// How the waypoint visiting order is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMode {
    /// Every permutation; factorial in the waypoint count
    #[default]
    Exact,
    /// Greedy nearest insertion; never cheaper than `Exact`
    NearestInsertion,
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMode::Exact => write!(f, "exact"),
            SolveMode::NearestInsertion => write!(f, "nearest-insertion"),
        }
    }
}

impl std::str::FromStr for SolveMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "exact" => Ok(SolveMode::Exact),
            "nearest-insertion" | "nearest_insertion" => Ok(SolveMode::NearestInsertion),
            other => Err(format!("unknown solve mode `{other}`")),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub mode: SolveMode,
    /// Exact mode refuses larger waypoint sets
    pub max_exact_waypoints: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { mode: SolveMode::Exact, max_exact_waypoints: 8 }
    }
}


/// A complete tour: origin, every station once, destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourPlan {
    pub mode: SolveMode,
    /// Stations in visiting order
    pub waypoint_order: Vec<VertexId>,
    pub route: Route,
    /// Fuel left on arrival at the destination
    pub fuel_remaining: f64,
}


/// Orders the essential vertices of a graph into the cheapest fuel-feasible tour.
///
/// Every leg is the A* route between consecutive stops; one [`FuelTank`] is
/// seeded with the budget per candidate tour and carried across its legs.
pub struct RouteSolver<'g> {
    graph: &'g GraphModel,
    config: SolverConfig,
}

impl<'g> RouteSolver<'g> {

    pub fn new(graph: &'g GraphModel, config: SolverConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Cheapest tour from `origin` through every essential vertex to `destination`.
    ///
    /// Fails with `Infeasible` when no visiting order works, and with
    /// `TooManyWaypoints` when exact mode is asked for more stations than
    /// `max_exact_waypoints`.
    pub fn solve<H>(&self, origin: VertexId, destination: VertexId, budget: f64, heuristic: H) -> Result<TourPlan>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        self.graph.require(origin)?;
        self.graph.require(destination)?;

        let waypoints: Vec<VertexId> = self.graph.essential_vertices().map(|vertex| vertex.id).collect();
        let mut legs = LegCache::new(self.graph, &heuristic);

        let (best, tour_order) = match self.config.mode {
            SolveMode::Exact => {
                if waypoints.len() > self.config.max_exact_waypoints {
                    return Err(Error::TooManyWaypoints {
                        count: waypoints.len(),
                        limit: self.config.max_exact_waypoints,
                    });
                }
                (self.best_permutation(&mut legs, origin, destination, &waypoints, budget)?, waypoints)
            }
            SolveMode::NearestInsertion => {
                let order = nearest_insertion(&mut legs, origin, destination, &waypoints)?;
                let stops = tour_stops(origin, &order, destination);
                (self.evaluate(&mut legs, &stops, budget)?.map(|tour| tour.with_order(order.clone())), order)
            }
        };

        let Some(best) = best else {
            let reason = self.classify(origin, destination, &tour_order)?;
            warn!(%origin, %destination, mode = %self.config.mode, %reason, "no feasible tour");
            return Err(Error::Infeasible(reason));
        };

        info!(
            mode = %self.config.mode,
            waypoints = best.order.len(),
            cost = best.route.cost(),
            fuel_remaining = best.fuel_remaining,
            legs_searched = legs.len(),
            "tour selected"
        );

        Ok(TourPlan {
            mode: self.config.mode,
            waypoint_order: best.order,
            route: best.route,
            fuel_remaining: best.fuel_remaining,
        })
    }

    /// Every waypoint order, lexicographic by construction index; first
    /// minimum wins
    fn best_permutation<H>(
        &self,
        legs: &mut LegCache<'_, 'g, H>,
        origin: VertexId,
        destination: VertexId,
        waypoints: &[VertexId],
        budget: f64,
    ) -> Result<Option<Tour>>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        let mut permutation: Vec<usize> = (0..waypoints.len()).collect();
        let mut best: Option<Tour> = None;
        let mut evaluated = 0usize;

        loop {
            let order: Vec<VertexId> = permutation.iter().map(|&index| waypoints[index]).collect();
            let stops = tour_stops(origin, &order, destination);
            if let Some(tour) = self.evaluate(legs, &stops, budget)? {
                if best.as_ref().is_none_or(|best| tour.route.cost() < best.route.cost()) {
                    best = Some(tour.with_order(order));
                }
            }
            evaluated += 1;

            if !next_permutation(&mut permutation) {
                break;
            }
        }

        debug!(evaluated, feasible = best.is_some(), "exact permutation search done");
        Ok(best)
    }

    /// Route and leftover fuel for one visiting order; `None` when a leg has
    /// no path or the tank runs dry
    fn evaluate<H>(&self, legs: &mut LegCache<'_, 'g, H>, stops: &[VertexId], budget: f64) -> Result<Option<Tour>>
    where
        H: Fn(&Point, &Point) -> f64,
    {
        let Some(&origin) = stops.first() else {
            return Ok(None);
        };

        let mut tank = FuelTank::new(budget);
        if !tank.has_fuel() {
            return Ok(None);
        }

        let mut route = Route::single(origin);
        for pair in stops.windows(2) {
            let Some(leg) = legs.leg(pair[0], pair[1])? else {
                return Ok(None);
            };
            match tank.replay(leg, self.graph) {
                Ok(_) => route.extend_with(leg),
                Err(Error::ResourceExhausted { .. }) => return Ok(None),
                Err(other) => return Err(other),
            }
        }

        Ok(Some(Tour { order: Vec::new(), route, fuel_remaining: tank.level() }))
    }

    /// Why no tour works: the first stop the origin cannot reach at all, or
    /// else not enough fuel
    fn classify(&self, origin: VertexId, destination: VertexId, order: &[VertexId]) -> Result<InfeasibleReason> {
        let reachable = cheapest_costs(self.graph, origin)?;
        let unreachable = order
            .iter()
            .chain(std::iter::once(&destination))
            .find(|id| !reachable.contains_key(id));

        Ok(match unreachable {
            Some(&vertex) => InfeasibleReason::Unreachable { vertex },
            None => InfeasibleReason::ResourceInsufficient,
        })
    }
}


struct Tour {
    order: Vec<VertexId>,
    route: Route,
    fuel_remaining: f64,
}

impl Tour {
    fn with_order(self, order: Vec<VertexId>) -> Self {
        Self { order, ..self }
    }
}


/// Unconstrained A* legs, searched once per `(from, to)` pair
struct LegCache<'h, 'g, H> {
    a_star: AStar<'g>,
    heuristic: &'h H,
    legs: FxHashMap<(VertexId, VertexId), Option<Route>>,
}

impl<'h, 'g, H> LegCache<'h, 'g, H>
where
    H: Fn(&Point, &Point) -> f64,
{
    fn new(graph: &'g GraphModel, heuristic: &'h H) -> Self {
        Self { a_star: AStar::new(graph), heuristic, legs: FxHashMap::default() }
    }

    fn len(&self) -> usize {
        self.legs.len()
    }

    /// `None` when no path exists
    fn leg(&mut self, from: VertexId, to: VertexId) -> Result<Option<&Route>> {
        let slot = match self.legs.entry((from, to)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let found = match self.a_star.find_path(from, to, self.heuristic) {
                    Ok(route) => Some(route),
                    Err(Error::NotFound { .. }) => None,
                    Err(other) => return Err(other),
                };
                debug!(%from, %to, found = found.is_some(), "leg searched");
                entry.insert(found)
            }
        };
        Ok(slot.as_ref())
    }

    /// Leg cost, infinite when there is no path
    fn cost(&mut self, from: VertexId, to: VertexId) -> Result<f64> {
        Ok(self.leg(from, to)?.map_or(f64::INFINITY, Route::cost))
    }
}


fn tour_stops(origin: VertexId, order: &[VertexId], destination: VertexId) -> Vec<VertexId> {
    let mut stops = Vec::with_capacity(order.len() + 2);
    stops.push(origin);
    stops.extend_from_slice(order);
    stops.push(destination);
    stops
}

/// Advance to the next lexicographic permutation; false after the last one
fn next_permutation(order: &mut [usize]) -> bool {
    let Some(pivot) = order.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        return false;
    };
    let Some(successor) = order.iter().rposition(|&value| value > order[pivot]) else {
        return false;
    };
    order.swap(pivot, successor);
    order[pivot + 1..].reverse();
    true
}

/// Waypoint order by nearest insertion.
///
/// Starts from `[origin, destination]`, repeatedly takes the unplaced waypoint
/// closest (by leg cost) to any stop already in the tour and inserts it where
/// it adds the least cost. Waypoints no stop can reach go last, in
/// construction order.
fn nearest_insertion<H>(
    legs: &mut LegCache<'_, '_, H>,
    origin: VertexId,
    destination: VertexId,
    waypoints: &[VertexId],
) -> Result<Vec<VertexId>>
where
    H: Fn(&Point, &Point) -> f64,
{
    let mut tour = vec![origin, destination];
    let mut unplaced = waypoints.to_vec();

    while !unplaced.is_empty() {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, &waypoint) in unplaced.iter().enumerate() {
            for &stop in &tour {
                let cost = legs.cost(stop, waypoint)?;
                if cost.is_finite() && nearest.is_none_or(|(_, best)| cost < best) {
                    nearest = Some((index, cost));
                }
            }
        }
        let Some((index, _)) = nearest else {
            break;
        };
        let waypoint = unplaced.remove(index);

        let mut cheapest: Option<(usize, f64)> = None;
        for position in 1..tour.len() {
            let (before, after) = (tour[position - 1], tour[position]);
            let detour = legs.cost(before, waypoint)? + legs.cost(waypoint, after)?;
            if !detour.is_finite() {
                continue;
            }
            let direct = legs.cost(before, after)?;
            let added = if direct.is_finite() { detour - direct } else { detour };
            if cheapest.is_none_or(|(_, best)| added < best) {
                cheapest = Some((position, added));
            }
        }
        let position = cheapest.map_or(tour.len() - 1, |(position, _)| position);
        tour.insert(position, waypoint);
    }

    for waypoint in unplaced {
        tour.insert(tour.len() - 1, waypoint);
    }
    Ok(tour[1..tour.len() - 1].to_vec())
}
