#![allow(dead_code)]

use fuelroute::{
    CellGrid, CellType, GraphModel, GridBuilder, GridConfig, GridCoord, MapMarkers, VertexId, parse_map,
};
use rand::Rng;

/// Graph built from literal map text, plus its entry/exit ids
pub struct Level {
    pub graph: GraphModel,
    pub entry: VertexId,
    pub exit: VertexId,
}

impl Level {
    pub fn at(&self, row: usize, col: usize) -> VertexId {
        self.graph.id_of(GridCoord::new(row, col))
    }
}

pub fn level(text: &str) -> Level {
    level_with(text, GridConfig::default())
}

pub fn level_with(text: &str, config: GridConfig) -> Level {
    let grid = parse_map(text).expect("test map parses");
    level_from_grid(&grid, config)
}

pub fn level_from_grid(grid: &CellGrid, config: GridConfig) -> Level {
    let mut markers = MapMarkers::default();
    let graph = GridBuilder::new(config)
        .build(grid, &mut markers)
        .expect("test map builds");
    let entry = graph.id_of(markers.entry.expect("map has an entry").0);
    let exit = graph.id_of(markers.exit.expect("map has an exit").0);
    Level { graph, entry, exit }
}

/// Random grid with rocks, `stations` station cells, one entry and one exit.
/// Marker cells never land on the same cell.
pub fn random_level<R: Rng>(rng: &mut R, rows: usize, cols: usize, stations: usize, rock_chance: f64) -> Level {
    let mut grid = CellGrid::filled(rows, cols, CellType::Ground).expect("non-empty grid");
    for row in 0..rows {
        for col in 0..cols {
            if rng.random_bool(rock_chance) {
                grid.set(GridCoord::new(row, col), CellType::Rock);
            }
        }
    }

    let mut cells: Vec<GridCoord> = Vec::new();
    while cells.len() < stations + 2 {
        let coord = GridCoord::new(rng.random_range(0..rows), rng.random_range(0..cols));
        if !cells.contains(&coord) {
            cells.push(coord);
        }
    }
    grid.set(cells[0], CellType::Entry);
    grid.set(cells[1], CellType::Exit);
    for (index, &coord) in cells[2..].iter().enumerate() {
        let station = if index % 2 == 0 { CellType::VerticalStation } else { CellType::HorizontalStation };
        grid.set(coord, station);
    }

    level_from_grid(&grid, GridConfig::default())
}
