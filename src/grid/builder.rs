use tracing::info;

use super::{CellGrid, CellType, GridConfig, GridCoord};
use crate::errors::{ConstructionError, Result};
use crate::geometry::Point;
use crate::graph::{GraphModel, Vertex};


/// Receives the entry and exit cells found while building a graph.
///
/// Entry and exit are plain walkable vertices in the graph; where they are
/// only matters to whoever places the agent and the goal.
pub trait GridEnvironment {
    fn on_entry(&mut self, coord: GridCoord, position: Point);
    fn on_exit(&mut self, coord: GridCoord, position: Point);
}

/// Ignores entry/exit reports
impl GridEnvironment for () {
    fn on_entry(&mut self, _coord: GridCoord, _position: Point) {}
    fn on_exit(&mut self, _coord: GridCoord, _position: Point) {}
}


/// Records where the entry and exit cells are
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapMarkers {
    pub entry: Option<(GridCoord, Point)>,
    pub exit: Option<(GridCoord, Point)>,
}

impl GridEnvironment for MapMarkers {
    fn on_entry(&mut self, coord: GridCoord, position: Point) {
        self.entry = Some((coord, position));
    }

    fn on_exit(&mut self, coord: GridCoord, position: Point) {
        self.exit = Some((coord, position));
    }
}


/// Turns a [`CellGrid`] into a [`GraphModel`]
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    config: GridConfig,
}

impl GridBuilder {

    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Build the graph.
    /// One vertex per walkable cell, linked to its walkable neighbours under
    /// the configured neighbourhood. Entry/exit cells are reported to `env`.
    pub fn build<E: GridEnvironment + ?Sized>(&self, grid: &CellGrid, env: &mut E) -> Result<GraphModel> {
        self.config.validate()?;

        let (rows, cols) = (grid.rows(), grid.cols());
        let mut graph = GraphModel::with_dimensions(
            rows,
            cols,
            self.config.cell_size,
            self.config.default_cost,
            self.config.max_sampling_attempts,
        );

        // markers are checked before anything is reported
        let mut entry = None;
        let mut exit = None;
        for (coord, cell) in grid.iter() {
            let slot = match cell {
                CellType::Entry => (&mut entry, "entry"),
                CellType::Exit => (&mut exit, "exit"),
                _ => continue,
            };
            if slot.0.is_some() {
                return Err(ConstructionError::DuplicateMarker {
                    kind: slot.1,
                    row: coord.row,
                    col: coord.col,
                }
                .into());
            }
            *slot.0 = Some(coord);
        }

        for (coord, cell) in grid.iter() {
            if !cell.is_walkable() {
                continue;
            }
            let fuel_delta = if cell == CellType::Fuel { self.config.fuel_gain } else { 0.0 };
            graph.insert_vertex(Vertex {
                id: graph.id_of(coord),
                coord,
                position: graph.position_of(coord),
                cost: self.config.default_cost,
                fuel_delta,
                essential: cell.is_station(),
                kind: cell,
            });
        }

        let offsets = self.config.neighborhood.offsets();
        for (coord, cell) in grid.iter() {
            if !cell.is_walkable() {
                continue;
            }
            let from = graph.id_of(coord);
            for &(dr, dc) in offsets {
                let (r, c) = (coord.row as isize + dr, coord.col as isize + dc);
                if !graph.is_walkable(r, c) {
                    continue;
                }
                let to = graph.id_of(GridCoord::new(r as usize, c as usize));
                graph.link(from, to);
            }
        }

        if let Some(coord) = entry {
            env.on_entry(coord, graph.position_of(coord));
        }
        if let Some(coord) = exit {
            env.on_exit(coord, graph.position_of(coord));
        }

        info!(
            rows,
            cols,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            stations = graph.essential_vertices().count(),
            neighborhood = ?self.config.neighborhood,
            "built grid graph"
        );

        Ok(graph)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::graph::VertexId;
    use crate::grid::{Neighborhood, parse_map};

    fn ids(graph: &GraphModel, row: usize, col: usize) -> Vec<VertexId> {
        let id = graph.id_of(GridCoord::new(row, col));
        graph.neighbours(id).map(|v| v.id).collect()
    }

    #[test]
    fn one_vertex_per_walkable_cell() {
        let grid = parse_map("height 2\nwidth 4\nS.rg\nVhHE\n").unwrap();
        let graph = GridBuilder::default().build(&grid, &mut ()).unwrap();
        assert_eq!(graph.vertex_count(), 6);
        assert!(graph.vertex_at(GridCoord::new(0, 2)).is_none());
        assert!(graph.vertex_at(GridCoord::new(1, 1)).is_none());
    }

    #[test]
    fn cell_kinds_set_vertex_fields() {
        let grid = parse_map("height 2\nwidth 3\nS.g\nVHE\n").unwrap();
        let config = GridConfig { default_cost: 2.5, fuel_gain: 7.0, ..GridConfig::default() };
        let graph = GridBuilder::new(config).build(&grid, &mut ()).unwrap();

        let fuel = graph.vertex_at(GridCoord::new(0, 2)).unwrap();
        assert_eq!(fuel.fuel_delta, 7.0);
        assert!(!fuel.essential);

        let stations: Vec<GridCoord> = graph.essential_vertices().map(|v| v.coord).collect();
        assert_eq!(stations, vec![GridCoord::new(1, 0), GridCoord::new(1, 1)]);
        assert!(graph.vertices().all(|v| v.cost == 2.5));
    }

    #[test]
    fn four_neighbourhood_links_cardinals() {
        let grid = parse_map("height 3\nwidth 3\n...\n...\n...\n").unwrap();
        let graph = GridBuilder::default().build(&grid, &mut ()).unwrap();

        let centre = ids(&graph, 1, 1);
        assert_eq!(centre, vec![VertexId(1), VertexId(3), VertexId(5), VertexId(7)]);
        assert_eq!(ids(&graph, 0, 0), vec![VertexId(1), VertexId(3)]);
        assert_eq!(graph.edge_count(), 24);
    }

    #[test]
    fn eight_neighbourhood_links_diagonals() {
        let grid = parse_map("height 3\nwidth 3\n...\n.r.\n...\n").unwrap();
        let config = GridConfig { neighborhood: Neighborhood::Eight, ..GridConfig::default() };
        let graph = GridBuilder::new(config).build(&grid, &mut ()).unwrap();

        assert_eq!(ids(&graph, 0, 0), vec![VertexId(1), VertexId(3)]);
        assert_eq!(ids(&graph, 0, 1), vec![VertexId(0), VertexId(2), VertexId(3), VertexId(5)]);
    }

    #[test]
    fn entry_and_exit_are_reported() {
        let grid = parse_map("height 2\nwidth 3\nS..\n..E\n").unwrap();
        let config = GridConfig { cell_size: 2.0, ..GridConfig::default() };
        let mut markers = MapMarkers::default();
        GridBuilder::new(config).build(&grid, &mut markers).unwrap();

        assert_eq!(markers.entry, Some((GridCoord::new(0, 0), Point::new(0.0, 0.0))));
        assert_eq!(markers.exit, Some((GridCoord::new(1, 2), Point::new(4.0, 2.0))));
    }

    #[test]
    fn duplicate_exit_is_a_construction_error() {
        let mut grid = parse_map("height 1\nwidth 3\nS.E\n").unwrap();
        grid.set(GridCoord::new(0, 1), CellType::Exit);
        let err = GridBuilder::default().build(&grid, &mut ()).unwrap_err();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError::DuplicateMarker { kind: "exit", row: 0, col: 2 })
        ));
    }

    #[test]
    fn invalid_config_aborts_build() {
        let grid = parse_map("height 1\nwidth 1\n.\n").unwrap();
        let config = GridConfig { fuel_gain: -1.0, ..GridConfig::default() };
        assert!(GridBuilder::new(config).build(&grid, &mut ()).is_err());
    }
}
