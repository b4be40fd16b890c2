use thiserror::Error;

use crate::graph::VertexId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for graph construction, search and tour planning.
#[derive(Debug, Error)]
pub enum Error {
    /// Map input or configuration was malformed; nothing was built.
    #[error("graph construction failed: {0}")]
    Construction(#[from] ConstructionError),

    /// No path exists between the two vertices, whatever the fuel.
    #[error("no path from {origin} to {destination}")]
    NotFound {
        origin: VertexId,
        destination: VertexId,
    },

    /// A path exists but the fuel budget runs out along it.
    #[error("fuel exhausted travelling from {origin} to {destination}{}", format_exhausted_at(.at))]
    ResourceExhausted {
        origin: VertexId,
        destination: VertexId,
        at: Option<VertexId>,
    },

    /// No visiting order completes the tour.
    #[error("no feasible tour: {0}")]
    Infeasible(InfeasibleReason),

    /// Random sampling gave up before hitting a walkable cell.
    #[error("no walkable cell found after {attempts} random samples")]
    SamplingExhausted { attempts: usize },

    /// The grid has no walkable cell at all.
    #[error("grid contains no walkable cell")]
    NoWalkableCell,

    /// Id does not name a vertex of the graph.
    #[error("vertex {0} is not part of the graph")]
    UnknownVertex(VertexId),

    /// Exact ordering refused because of the factorial blow-up.
    #[error("{count} waypoints exceed the exact solver limit of {limit}; use nearest-insertion mode")]
    TooManyWaypoints { count: usize, limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Infeasibility reason, if this error reports an infeasible tour.
    pub fn infeasible_reason(&self) -> Option<InfeasibleReason> {
        match self {
            Error::Infeasible(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why the tour solver could not produce any tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum InfeasibleReason {
    /// `vertex` cannot be reached from the origin at any fuel level.
    Unreachable { vertex: VertexId },
    /// Every stop is reachable, but no order fits the fuel budget.
    ResourceInsufficient,
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfeasibleReason::Unreachable { vertex } => {
                write!(f, "vertex {vertex} is unreachable")
            }
            InfeasibleReason::ResourceInsufficient => {
                f.write_str("fuel budget is insufficient for every visiting order")
            }
        }
    }
}

/// Errors raised while decoding a map or building the graph.
#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("grid must have at least one row and one column")]
    ZeroDimensions,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell tag {tag:?} at row {row}, column {col}")]
    UnknownCell { row: usize, col: usize, tag: char },

    #[error("map header is missing the `{0}` line")]
    MissingHeader(&'static str),

    #[error("invalid header on line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("map declares {expected} rows but contains {found}")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("second {kind} cell at row {row}, column {col}")]
    DuplicateMarker {
        kind: &'static str,
        row: usize,
        col: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn format_exhausted_at(at: &Option<VertexId>) -> String {
    match at {
        Some(vertex) => format!(" (ran dry entering {vertex})"),
        None => " (budget must be positive)".to_string(),
    }
}
