use num_traits::{Num, Signed, Float};
use serde::{Deserialize, Serialize};

use crate::grid::Neighborhood;


/// Manhattan distance
pub fn manhattan_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Num + Copy + Signed,
    {
    (x1 - x2).abs() + (y1 - y2).abs()
}

/// Chebyshev distance, the step count when diagonals are allowed
pub fn chebyshev_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Num + Copy + Signed + PartialOrd,
    {
    let (dx, dy) = ((x1 - x2).abs(), (y1 - y2).abs());
    if dx > dy { dx } else { dy }
}

/// Euclidean distance
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// 2D world position.
/// `x` grows with the column index, `y` with the row index.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean(self.x, self.y, other.x, other.y)
    }

    /// Point a fraction `t` of the way towards `other`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}


/// Ready-made heuristics for A*.
///
/// Any `Fn(&Point, &Point) -> f64` works as a heuristic; these cover the
/// usual grid cases. Estimates are in world units, so they only hold while
/// every cell costs at least `cell_size`.
///
/// Every step enters one cell whether it is straight or diagonal. On a
/// 4-connected grid Manhattan, Euclidean and Chebyshev are all admissible.
/// On an 8-connected grid a diagonal step covers Manhattan 2 and Euclidean
/// √2 for the price of one cell, so only Chebyshev and Zero are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Always zero, A* degrades to Dijkstra
    Zero,
    #[default]
    Manhattan,
    Euclidean,
    Chebyshev,
}

impl Heuristic {
    pub fn estimate(self, a: &Point, b: &Point) -> f64 {
        match self {
            Heuristic::Zero => 0.0,
            Heuristic::Manhattan => manhattan_distance(a.x, a.y, b.x, b.y),
            Heuristic::Euclidean => a.distance_to(b),
            Heuristic::Chebyshev => chebyshev_distance(a.x, a.y, b.x, b.y),
        }
    }

    /// Tightest bundled heuristic that never overestimates on `neighborhood`
    pub fn for_neighborhood(neighborhood: Neighborhood) -> Self {
        match neighborhood {
            Neighborhood::Four => Heuristic::Manhattan,
            Neighborhood::Eight => Heuristic::Chebyshev,
        }
    }

    pub fn is_admissible_on(self, neighborhood: Neighborhood) -> bool {
        match neighborhood {
            Neighborhood::Four => true,
            Neighborhood::Eight => matches!(self, Heuristic::Zero | Heuristic::Chebyshev),
        }
    }

    pub fn as_fn(self) -> impl Fn(&Point, &Point) -> f64 + Copy {
        move |a: &Point, b: &Point| self.estimate(a, b)
    }
}

impl std::str::FromStr for Heuristic {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "zero" => Ok(Heuristic::Zero),
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "chebyshev" => Ok(Heuristic::Chebyshev),
            other => Err(format!("unknown heuristic `{other}`")),
        }
    }
}
