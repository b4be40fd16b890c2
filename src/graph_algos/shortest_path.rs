use super::GraphNodeMap;

/// Sentinel parent index of the start node in a [`GraphNodeMap`]
pub(crate) const NO_PARENT: usize = usize::MAX;

/// Walk parent links back from `goal_index`.
/// `record` maps an index to (node, parent index); the walk stops at a record
/// with no parent. Returns the ordered path from start to goal, or `None` if
/// a link points at a missing record.
pub(crate) fn trace_back<N, F>(goal_index: usize, record: F) -> Option<Vec<N>>
where
    F: Fn(usize) -> Option<(N, Option<usize>)>,
{
    let mut path = Vec::new();
    let mut current_index = Some(goal_index);

    // Trace back from goal to start
    while let Some(index) = current_index {
        let (node, parent) = record(index)?;
        path.push(node);
        current_index = parent;
    }

    // The path is in reverse order, so reverse it
    path.reverse();

    if path.is_empty() {
        return None;
    }

    Some(path)
}

/// Construct the shortest path from the goal node to the start node
/// Returns the ordered path as a vector of nodes from start to goal
/// node_map: GraphNodeMap<N, C> - map of nodes with their parent index and cost
/// goal_index: usize - index of the goal node in the node_map
pub(crate) fn shortest_path<N, C>(node_map: &GraphNodeMap<N, C>, goal_index: usize) -> Option<Vec<N>>
where
    N: Clone,
{
    trace_back(goal_index, |index| {
        node_map.get_index(index).map(|(node, &(parent_index, _))| {
            let parent = (parent_index != NO_PARENT).then_some(parent_index);
            (node.clone(), parent)
        })
    })
}
