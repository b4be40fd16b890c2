//! Text map decoding.
//!
//! ```text
//! type octile        <- optional
//! height 4
//! width 5
//! map                <- optional
//! S..r.
//! .V.r.
//! ..g..
//! r...E
//! ```

use std::path::Path;

use tracing::debug;

use super::{CellGrid, CellType};
use crate::errors::{ConstructionError, Result};


/// Read and decode a map file
pub fn load_map(path: impl AsRef<Path>) -> Result<CellGrid> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loaded map file");
    parse_map(&text)
}

/// Decode map text into a [`CellGrid`]
pub fn parse_map(text: &str) -> Result<CellGrid> {
    let mut lines = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .peekable();

    if let Some((_, line)) = lines.peek() {
        if line.trim_start().starts_with("type") {
            lines.next();
        }
    }

    let rows = header_value(lines.next(), "height")?;
    let cols = header_value(lines.next(), "width")?;
    if rows == 0 || cols == 0 {
        return Err(ConstructionError::ZeroDimensions.into());
    }

    if let Some((_, line)) = lines.peek() {
        if line.trim() == "map" {
            lines.next();
        }
    }

    let body: Vec<&str> = lines.map(|(_, line)| line).collect();
    let used = body
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);
    if used != rows {
        return Err(ConstructionError::RowCountMismatch { expected: rows, found: used }.into());
    }

    let mut grid = Vec::with_capacity(rows);
    for (row, line) in body[..used].iter().enumerate() {
        let mut cells = Vec::with_capacity(cols);
        for (col, tag) in line.chars().enumerate() {
            let cell = CellType::from_tag(tag)
                .ok_or(ConstructionError::UnknownCell { row, col, tag })?;
            cells.push(cell);
        }
        if cells.len() != cols {
            return Err(ConstructionError::RaggedRow { row, expected: cols, found: cells.len() }.into());
        }
        grid.push(cells);
    }

    CellGrid::from_rows(grid)
}

/// Parse a `<name> <value>` header line
fn header_value(line: Option<(usize, &str)>, name: &'static str) -> Result<usize> {
    let Some((index, line)) = line else {
        return Err(ConstructionError::MissingHeader(name).into());
    };

    let mut parts = line.split_whitespace();
    if parts.next() != Some(name) {
        return Err(ConstructionError::MissingHeader(name).into());
    }

    let value = parts.next().ok_or_else(|| ConstructionError::InvalidHeader {
        line: index + 1,
        message: format!("`{name}` has no value"),
    })?;

    value.parse::<usize>().map_err(|err| {
        ConstructionError::InvalidHeader {
            line: index + 1,
            message: format!("`{name}` value {value:?}: {err}"),
        }
        .into()
    })
}
