//! In-memory grid graph: one vertex per walkable cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collections::{FxIndexMap, FxIndexSet};
use crate::errors::{ConstructionError, Error, Result};
use crate::geometry::Point;
use crate::grid::{CellType, GridCoord};
use crate::spatial::SpatialIndex;


/// Stable vertex identifier, `max(rows, cols) * row + col`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}


/// One walkable cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vertex {
    pub id: VertexId,
    pub coord: GridCoord,
    /// World position of the cell centre
    pub position: Point,
    /// Cost paid (and fuel burnt) entering this cell
    pub cost: f64,
    /// Fuel gained entering this cell
    pub fuel_delta: f64,
    /// Mandatory waypoint
    pub essential: bool,
    pub kind: CellType,
}


/// Weighted grid graph.
///
/// Vertices and adjacency are kept in construction (row-major) order, so
/// every iteration over the graph is deterministic.
#[derive(Debug, Clone)]
pub struct GraphModel {
    rows: usize,
    cols: usize,
    cell_size: f64,
    default_cost: f64,
    max_sampling_attempts: usize,
    vertices: FxIndexMap<VertexId, Vertex>,
    adjacency: FxIndexMap<VertexId, FxIndexSet<VertexId>>,
    walkable: Vec<bool>,
}

impl GraphModel {

    /// Empty graph over a `rows` x `cols` grid; used by the grid builder
    pub(crate) fn with_dimensions(
        rows: usize,
        cols: usize,
        cell_size: f64,
        default_cost: f64,
        max_sampling_attempts: usize,
    ) -> Self {
        Self {
            rows,
            cols,
            cell_size,
            default_cost,
            max_sampling_attempts,
            vertices: FxIndexMap::default(),
            adjacency: FxIndexMap::default(),
            walkable: vec![false; rows * cols],
        }
    }

    pub(crate) fn insert_vertex(&mut self, vertex: Vertex) {
        let coord = vertex.coord;
        self.walkable[coord.row * self.cols + coord.col] = true;
        self.adjacency.insert(vertex.id, FxIndexSet::default());
        self.vertices.insert(vertex.id, vertex);
    }

    /// Link `from` -> `to`. Both must already be vertices.
    pub(crate) fn link(&mut self, from: VertexId, to: VertexId) {
        debug_assert!(self.vertices.contains_key(&to));
        if let Some(neighbours) = self.adjacency.get_mut(&from) {
            neighbours.insert(to);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn default_cost(&self) -> f64 {
        self.default_cost
    }

    pub(crate) fn max_sampling_attempts(&self) -> usize {
        self.max_sampling_attempts
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(FxIndexSet::len).sum()
    }

    /// Id a cell would have, walkable or not
    pub fn id_of(&self, coord: GridCoord) -> VertexId {
        VertexId(self.rows.max(self.cols) * coord.row + coord.col)
    }

    /// Inverse of [`GraphModel::id_of`]; `None` for ids outside the grid
    pub fn coord_of(&self, id: VertexId) -> Option<GridCoord> {
        let stride = self.rows.max(self.cols);
        let coord = GridCoord::new(id.0 / stride, id.0 % stride);
        (coord.row < self.rows && coord.col < self.cols).then_some(coord)
    }

    /// Centre of a cell in world space
    pub fn position_of(&self, coord: GridCoord) -> Point {
        Point::new(coord.col as f64 * self.cell_size, coord.row as f64 * self.cell_size)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub(crate) fn require(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices.get(&id).ok_or(Error::UnknownVertex(id))
    }

    pub fn vertex_at(&self, coord: GridCoord) -> Option<&Vertex> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        self.vertices.get(&self.id_of(coord))
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Vertices in construction order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Station vertices in construction order
    pub fn essential_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values().filter(|vertex| vertex.essential)
    }

    /// Neighbours of `id` in link order; empty for unknown ids
    pub fn neighbours(&self, id: VertexId) -> impl Iterator<Item = &Vertex> {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|neighbour| self.vertices.get(neighbour))
    }

    /// Walkability of a signed cell address; out of bounds is not walkable
    pub fn is_walkable(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        row < self.rows && col < self.cols && self.walkable[row * self.cols + col]
    }

    /// Spatial queries (nearest vertex, random vertex) over this graph
    pub fn spatial(&self) -> SpatialIndex<'_> {
        SpatialIndex::new(self)
    }

    pub fn set_cost(&mut self, id: VertexId, cost: f64) -> Result<()> {
        check_cost(cost)?;
        let vertex = self.vertices.get_mut(&id).ok_or(Error::UnknownVertex(id))?;
        vertex.cost = cost;
        Ok(())
    }

    pub fn set_fuel_delta(&mut self, id: VertexId, fuel_delta: f64) -> Result<()> {
        if !fuel_delta.is_finite() {
            return Err(ConstructionError::InvalidConfig(format!(
                "fuel delta must be finite, got {fuel_delta}"
            ))
            .into());
        }
        let vertex = self.vertices.get_mut(&id).ok_or(Error::UnknownVertex(id))?;
        vertex.fuel_delta = fuel_delta;
        Ok(())
    }

    /// Raise costs around `position`.
    ///
    /// The nearest vertex gets `default_cost * multiplier^2` unless it lies on
    /// the grid border; its in-bounds 4-neighbours get
    /// `default_cost * multiplier`. Returns the centre vertex.
    pub fn apply_cost_field(&mut self, position: &Point, multiplier: f64) -> Result<VertexId> {
        let outer = self.default_cost * multiplier;
        let inner = outer * multiplier;
        check_cost(outer)?;
        check_cost(inner)?;

        let centre = self.spatial().nearest_vertex(position)?.coord;
        let interior = centre.row > 0
            && centre.row + 1 < self.rows
            && centre.col > 0
            && centre.col + 1 < self.cols;

        if interior {
            self.set_cell_cost(centre, inner);
        }
        let (row, col) = (centre.row as isize, centre.col as isize);
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let (r, c) = (row + dr, col + dc);
            if r >= 0 && c >= 0 {
                self.set_cell_cost(GridCoord::new(r as usize, c as usize), outer);
            }
        }

        tracing::debug!(centre = %centre, multiplier, "applied cost field");
        Ok(self.id_of(centre))
    }

    /// Cost write that silently skips non-vertex cells
    fn set_cell_cost(&mut self, coord: GridCoord, cost: f64) {
        if coord.row >= self.rows || coord.col >= self.cols {
            return;
        }
        let id = self.id_of(coord);
        if let Some(vertex) = self.vertices.get_mut(&id) {
            vertex.cost = cost;
        }
    }
}

fn check_cost(cost: f64) -> Result<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(ConstructionError::InvalidConfig(format!(
            "vertex cost must be finite and non-negative, got {cost}"
        ))
        .into());
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellGrid, GridBuilder, GridConfig, parse_map};

    fn open_grid(rows: usize, cols: usize) -> GraphModel {
        let grid = CellGrid::filled(rows, cols, CellType::Ground).unwrap();
        GridBuilder::new(GridConfig::default()).build(&grid, &mut ()).unwrap()
    }

    #[test]
    fn ids_follow_the_larger_dimension() {
        let graph = open_grid(2, 5);
        let id = graph.id_of(GridCoord::new(1, 3));
        assert_eq!(id, VertexId(8));
        assert_eq!(graph.coord_of(id), Some(GridCoord::new(1, 3)));
        assert!(graph.vertex(id).is_some());
    }

    #[test]
    fn coord_of_rejects_ids_outside_grid() {
        let graph = open_grid(2, 5);
        // stride 5, row 1 col 4 is the last cell
        assert_eq!(graph.coord_of(VertexId(9)), Some(GridCoord::new(1, 4)));
        assert_eq!(graph.coord_of(VertexId(10)), None);
    }

    #[test]
    fn adjacency_only_references_vertices() {
        let graph = parse_map("height 3\nwidth 3\n.r.\n...\nt..\n")
            .and_then(|grid| GridBuilder::new(GridConfig::default()).build(&grid, &mut ()))
            .unwrap();
        for vertex in graph.vertices() {
            for neighbour in graph.neighbours(vertex.id) {
                assert!(graph.contains(neighbour.id));
                assert!(graph.is_walkable(neighbour.coord.row as isize, neighbour.coord.col as isize));
            }
        }
        assert_eq!(graph.vertex_count(), 7);
    }

    #[test]
    fn walkability_outside_bounds_is_false() {
        let graph = open_grid(3, 3);
        assert!(graph.is_walkable(0, 0));
        assert!(!graph.is_walkable(-1, 0));
        assert!(!graph.is_walkable(0, 3));
    }

    #[test]
    fn cost_field_raises_centre_and_cross() {
        let mut graph = open_grid(5, 5);
        let centre = graph.apply_cost_field(&Point::new(2.0, 2.0), 3.0).unwrap();
        assert_eq!(centre, graph.id_of(GridCoord::new(2, 2)));

        let cost = |graph: &GraphModel, row, col| graph.vertex_at(GridCoord::new(row, col)).unwrap().cost;
        assert_eq!(cost(&graph, 2, 2), 9.0);
        assert_eq!(cost(&graph, 1, 2), 3.0);
        assert_eq!(cost(&graph, 3, 2), 3.0);
        assert_eq!(cost(&graph, 2, 1), 3.0);
        assert_eq!(cost(&graph, 2, 3), 3.0);
        assert_eq!(cost(&graph, 1, 1), 1.0);
    }

    #[test]
    fn cost_field_on_border_leaves_centre() {
        let mut graph = open_grid(4, 4);
        graph.apply_cost_field(&Point::new(0.0, 0.0), 2.0).unwrap();
        let cost = |row, col| graph.vertex_at(GridCoord::new(row, col)).unwrap().cost;
        assert_eq!(cost(0, 0), 1.0);
        assert_eq!(cost(0, 1), 2.0);
        assert_eq!(cost(1, 0), 2.0);
    }

    #[test]
    fn negative_costs_are_rejected() {
        let mut graph = open_grid(2, 2);
        let id = graph.id_of(GridCoord::new(0, 0));
        assert!(graph.set_cost(id, -1.0).is_err());
        assert!(graph.set_cost(id, 4.0).is_ok());
        assert_eq!(graph.vertex(id).unwrap().cost, 4.0);
        assert!(matches!(graph.set_cost(VertexId(999), 1.0), Err(Error::UnknownVertex(_))));
    }
}
