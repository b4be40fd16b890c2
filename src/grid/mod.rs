//! Grid input: cell tags, decoded grids and the grid -> graph builder.

pub mod builder;
pub mod map_file;

pub use builder::{GridBuilder, GridEnvironment, MapMarkers};
pub use map_file::{load_map, parse_map};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ConstructionError, Result};


/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Ground,
    Fuel,
    Rock,
    Tree,
    House,
    Wall,
    VerticalStation,
    HorizontalStation,
    Entry,
    Exit,
}

impl CellType {
    /// Obstacles never become vertices
    pub fn is_walkable(self) -> bool {
        !matches!(self, CellType::Rock | CellType::Tree | CellType::House | CellType::Wall)
    }

    /// Stations are the mandatory waypoints
    pub fn is_station(self) -> bool {
        matches!(self, CellType::VerticalStation | CellType::HorizontalStation)
    }

    /// Decode a map character
    pub fn from_tag(tag: char) -> Option<Self> {
        let cell = match tag {
            '.' | 'G' => CellType::Ground,
            'g' => CellType::Fuel,
            'r' => CellType::Rock,
            't' => CellType::Tree,
            'h' => CellType::House,
            '@' | 'W' => CellType::Wall,
            'V' => CellType::VerticalStation,
            'H' => CellType::HorizontalStation,
            'S' => CellType::Entry,
            'E' => CellType::Exit,
            _ => return None,
        };
        Some(cell)
    }

    /// Canonical map character
    pub fn tag(self) -> char {
        match self {
            CellType::Ground => '.',
            CellType::Fuel => 'g',
            CellType::Rock => 'r',
            CellType::Tree => 't',
            CellType::House => 'h',
            CellType::Wall => '@',
            CellType::VerticalStation => 'V',
            CellType::HorizontalStation => 'H',
            CellType::Entry => 'S',
            CellType::Exit => 'E',
        }
    }
}


/// Row/column address of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

impl GridCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}


/// Decoded rectangular map, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<CellType>,
}

impl CellGrid {

    /// Build from rows of cells.
    /// Every row must have the same, non-zero, length.
    pub fn from_rows(rows: Vec<Vec<CellType>>) -> Result<Self> {
        let row_count = rows.len();
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if row_count == 0 || cols == 0 {
            return Err(ConstructionError::ZeroDimensions.into());
        }

        let mut cells = Vec::with_capacity(row_count * cols);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != cols {
                return Err(ConstructionError::RaggedRow {
                    row,
                    expected: cols,
                    found: line.len(),
                }
                .into());
            }
            cells.extend(line);
        }

        Ok(Self { rows: row_count, cols, cells })
    }

    /// Grid of one repeated cell type
    pub fn filled(rows: usize, cols: usize, cell: CellType) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ConstructionError::ZeroDimensions.into());
        }
        Ok(Self { rows, cols, cells: vec![cell; rows * cols] })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, coord: GridCoord) -> Option<CellType> {
        if coord.row >= self.rows || coord.col >= self.cols {
            return None;
        }
        Some(self.cells[coord.row * self.cols + coord.col])
    }

    /// Overwrite one cell; out-of-bounds writes are ignored and return false
    pub fn set(&mut self, coord: GridCoord, cell: CellType) -> bool {
        if coord.row >= self.rows || coord.col >= self.cols {
            return false;
        }
        self.cells[coord.row * self.cols + coord.col] = cell;
        true
    }

    /// Cells in row-major order together with their coordinates
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, CellType)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, &cell)| (GridCoord::new(index / cols, index % cols), cell))
    }
}


/// Which cells count as neighbours when linking vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// N, S, E, W
    #[default]
    Four,
    /// All eight surrounding cells
    Eight,
}

impl Neighborhood {
    /// Row/column offsets in the order neighbours are linked
    pub fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, -1), (-1, 0), (-1, 1),
            (0, -1), (0, 1),
            (1, -1), (1, 0), (1, 1),
        ];
        match self {
            Neighborhood::Four => &FOUR,
            Neighborhood::Eight => &EIGHT,
        }
    }
}

impl std::str::FromStr for Neighborhood {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "four" | "4" => Ok(Neighborhood::Four),
            "eight" | "8" => Ok(Neighborhood::Eight),
            other => Err(format!("unknown neighborhood `{other}`")),
        }
    }
}


/// Grid -> graph construction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World size of one cell; positions are `index * cell_size`
    pub cell_size: f64,
    /// Traversal cost given to every vertex
    pub default_cost: f64,
    /// Fuel gained when entering a fuel cell
    pub fuel_gain: f64,
    pub neighborhood: Neighborhood,
    /// Upper bound on random-position samples
    pub max_sampling_attempts: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            default_cost: 1.0,
            fuel_gain: 10.0,
            neighborhood: Neighborhood::Four,
            max_sampling_attempts: 1000,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(invalid(format!("cell_size must be positive, got {}", self.cell_size)));
        }
        if !self.default_cost.is_finite() || self.default_cost < 0.0 {
            return Err(invalid(format!(
                "default_cost must be non-negative, got {}",
                self.default_cost
            )));
        }
        if !self.fuel_gain.is_finite() || self.fuel_gain <= 0.0 {
            return Err(invalid(format!("fuel_gain must be positive, got {}", self.fuel_gain)));
        }
        if self.max_sampling_attempts == 0 {
            return Err(invalid("max_sampling_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> crate::errors::Error {
    ConstructionError::InvalidConfig(message).into()
}
