use crate::collections::{Cost, FxHashMap, FxIndexMap};
use crate::errors::{Error, Result};
use crate::graph::{GraphModel, VertexId};
use crate::route::Route;
use super::GraphNodeMap;
use super::shortest_path::{NO_PARENT, shortest_path};

use std::{collections::BinaryHeap, hash::Hash, cmp::Ordering, fmt::Debug, ops::Add};
use num_traits::Zero;
use indexmap::map::Entry::{Occupied, Vacant};


/// Identify the shortest path using Dijkstra's Algorithm
/// https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm
/// From start Node, traverse through graph until node meets goal criteria
pub fn dijkstra<N, C, IT, NN, G>(start: N, neighbors: NN, goal: G) -> Option<(Vec<N>, C)>
where
    N: Eq + Hash + Clone + Debug,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Zero + Ord + Copy + Debug + Add<Output = C>,
    G: Fn(&N) -> bool, // node qualifier for goal
    {

    // Build the graph - terminates when the goal is met
    let (node_map, goal_index) = build_dijkstra_graph(start, neighbors, goal);

    let goal_index = goal_index?;
    let cost = node_map.get_index(goal_index)?.1.1;
    let path = shortest_path(&node_map, goal_index)?;
    Some((path, cost))
}

/// Returns a full map of the graph, includes all (reachable) nodes and costs
pub fn dijkstra_nodes_full<N, C, IT, NN>(start: N, neighbors: NN) -> GraphNodeMap<N, C>
where
    N: Eq + Hash + Clone + Debug,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Zero + Ord + Copy + Debug + Add<Output = C>,
    {

    // No goal - runs until every reachable node is settled
    let (node_map, _) = build_dijkstra_graph(start, neighbors, |_| false);

    node_map
}


/// Traverses the graph using Dijkstra's algorithm
/// Returns a map of nodes with their smallest costs along with the index of the goal node
fn build_dijkstra_graph<N, C, IT, NN, G>(start: N, neighbors: NN, goal_fn: G) -> (FxIndexMap<N, (usize, C)>, Option<usize>)
where
    N: Eq + Hash + Clone + Debug,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Zero + Ord + Copy + Debug + Add<Output = C>,
    G: Fn(&N) -> bool // Returns true if goal is met
    {

    // Nodes to visit - binary heap sorts Biggest to Smallest, NodeId reverses it
    let mut nodes_to_visit: BinaryHeap<NodeId<C>> = BinaryHeap::new();

    // visited nodes - cost is known, no longer need to visit
    // The tuple contains (parent_index, cost) where parent_index is the index of the parent node in the map
    // for the start node, parent_index is set to NO_PARENT
    let mut nodes_map: FxIndexMap<N, (usize, C)> = FxIndexMap::default();

    // Add start node to the map and queue
    let start_index = nodes_map.insert_full(start, (NO_PARENT, Zero::zero())).0;
    nodes_to_visit.push(NodeId{
        index: start_index,
        cost: Zero::zero(), // This is the cost from the start node
    });

    // Loop over each node to visit, removing the smallest node
    while let Some(NodeId {cost, index}) = nodes_to_visit.pop() {

        // fetch current best cost for node
        let Some((node, &(_, c))) = nodes_map.get_index(index) else {
            continue;
        };

        // If cost of new node from BinaryHeap is higher than the best cost, skip it
        // This implies we've already found a better path to this node
        if cost > c {
            continue;
        }

        // Check if we've reached the goal
        if goal_fn(node) {
            return (nodes_map, Some(index));
        }

        let node = node.clone();

        // loop over neighbors
        for (neighbor, edge_cost) in neighbors(&node) {

            // new cost to reach this node = edge cost + node cost
            let new_cost = c + edge_cost;

            let neighbor_index = match nodes_map.entry(neighbor) {
                Vacant(e) => {
                    // This is the first time we're seeing this neighbor
                    let neighbor_index = e.index();
                    e.insert((index, new_cost));
                    neighbor_index
                }
                Occupied(mut e) => {
                    if e.get().1 > new_cost {
                        // We've found a better path to this neighbor
                        e.insert((index, new_cost));
                        e.index()
                    } else {
                        // The existing path is better, do nothing
                        continue;
                    }
                }
            };

            // Only add to the queue if we've found a better path
            nodes_to_visit.push(NodeId {
                index: neighbor_index,
                cost: new_cost,
            });
        }
    }

    (nodes_map, None)
}


/// Node identifier
/// - for ordering we only need cost and a way to identify the node
/// - Nodes can contain additional data, but we only need to identify them
#[derive(Debug)]
struct NodeId<T> {
    index: usize,
    cost: T
}

impl<T: Ord> Ord for NodeId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}
impl<T: Ord> PartialOrd for NodeId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: Ord> PartialEq for NodeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: Ord> Eq for NodeId<T> {}


/// Edge list of a vertex, weighted by the cost of entering the neighbour
fn weighted_neighbours(graph: &GraphModel, id: VertexId) -> Vec<(VertexId, Cost)> {
    graph
        .neighbours(id)
        .map(|vertex| (vertex.id, Cost(vertex.cost)))
        .collect()
}

/// Cheapest cost from `origin` to every vertex reachable from it.
/// Unreachable vertices are absent from the map.
pub fn cheapest_costs(graph: &GraphModel, origin: VertexId) -> Result<FxHashMap<VertexId, f64>> {
    graph.require(origin)?;
    let nodes = dijkstra_nodes_full(origin, |id: &VertexId| weighted_neighbours(graph, *id));
    Ok(nodes
        .into_iter()
        .map(|(id, (_, cost))| (id, cost.value()))
        .collect())
}

/// Cheapest route by plain Dijkstra, ignoring fuel
pub fn dijkstra_route(graph: &GraphModel, origin: VertexId, destination: VertexId) -> Result<Route> {
    graph.require(origin)?;
    graph.require(destination)?;
    let (steps, cost) = dijkstra(
        origin,
        |id: &VertexId| weighted_neighbours(graph, *id),
        |id| *id == destination,
    )
    .ok_or(Error::NotFound { origin, destination })?;
    Ok(Route::from_steps(steps, cost.value()))
}
