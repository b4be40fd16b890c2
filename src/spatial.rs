//! Position -> vertex queries over a [`GraphModel`].
//!
//! Nearest-vertex lookups walk grid cells (not graph edges) in expanding
//! 8-neighbour rings from the cell containing the query position. Random
//! sampling is probabilistic: it draws uniformly distributed cells up to the
//! configured attempt limit and may give up on sparse grids even though a
//! walkable cell exists.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, warn};

use crate::collections::FxHashSet;
use crate::errors::{Error, Result};
use crate::geometry::Point;
use crate::graph::{GraphModel, Vertex};
use crate::grid::GridCoord;


pub struct SpatialIndex<'g> {
    graph: &'g GraphModel,
}

impl<'g> SpatialIndex<'g> {

    pub fn new(graph: &'g GraphModel) -> Self {
        Self { graph }
    }

    /// Cell containing `position`, rounding to the nearest index.
    /// Positions off the grid are clamped onto its border.
    pub fn cell_at(&self, position: &Point) -> GridCoord {
        let size = self.graph.cell_size();
        let col = (position.x / size).round();
        let row = (position.y / size).round();
        let max_row = (self.graph.rows() - 1) as f64;
        let max_col = (self.graph.cols() - 1) as f64;

        let clamped_row = if row.is_nan() { 0.0 } else { row.clamp(0.0, max_row) };
        let clamped_col = if col.is_nan() { 0.0 } else { col.clamp(0.0, max_col) };
        if clamped_row != row || clamped_col != col {
            warn!(x = position.x, y = position.y, "position outside grid, clamped to border");
        }

        GridCoord::new(clamped_row as usize, clamped_col as usize)
    }

    /// Vertex nearest to `position` by ring expansion over grid cells.
    pub fn nearest_vertex(&self, position: &Point) -> Result<&'g Vertex> {
        let start = self.cell_at(position);

        let mut explored: FxHashSet<GridCoord> = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        explored.insert(start);

        while let Some(cell) = queue.pop_front() {
            if let Some(vertex) = self.graph.vertex_at(cell) {
                debug!(from = %start, found = %cell, explored = explored.len(), "nearest vertex");
                return Ok(vertex);
            }

            let (row, col) = (cell.row as isize, cell.col as isize);
            for dr in -1..=1 {
                for dc in -1..=1 {
                    let (r, c) = (row + dr, col + dc);
                    if (dr == 0 && dc == 0) || r < 0 || c < 0 {
                        continue;
                    }
                    let next = GridCoord::new(r as usize, c as usize);
                    if next.row >= self.graph.rows() || next.col >= self.graph.cols() {
                        continue;
                    }
                    if explored.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        Err(Error::NoWalkableCell)
    }

    /// Uniformly sampled walkable vertex, giving up after the configured
    /// number of attempts.
    pub fn random_walkable_vertex<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'g Vertex> {
        let attempts = self.graph.max_sampling_attempts();
        for _ in 0..attempts {
            let row = rng.random_range(0..self.graph.rows());
            let col = rng.random_range(0..self.graph.cols());
            if let Some(vertex) = self.graph.vertex_at(GridCoord::new(row, col)) {
                return Ok(vertex);
            }
        }
        Err(Error::SamplingExhausted { attempts })
    }
}
