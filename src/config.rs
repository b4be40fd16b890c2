use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConstructionError, Result};
use crate::geometry::Heuristic;
use crate::graph_algos::SolverConfig;
use crate::grid::GridConfig;


/// Everything a planning run needs besides the map itself.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "fuel_budget": 30, "grid": { "neighborhood": "eight" } }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub grid: GridConfig,
    pub solver: SolverConfig,
    /// Fuel in the tank at the origin
    pub fuel_budget: f64,
    /// A* heuristic; unset picks the one matching `grid.neighborhood`
    pub heuristic: Option<Heuristic>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            solver: SolverConfig::default(),
            fuel_budget: 50.0,
            heuristic: None,
        }
    }
}

impl PlannerConfig {

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading planner config");
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| ConstructionError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Heuristic the search runs with
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
            .unwrap_or_else(|| Heuristic::for_neighborhood(self.grid.neighborhood))
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        let heuristic = self.heuristic();
        if !heuristic.is_admissible_on(self.grid.neighborhood) {
            return Err(ConstructionError::InvalidConfig(format!(
                "heuristic {heuristic:?} overestimates on a {:?} neighborhood",
                self.grid.neighborhood
            ))
            .into());
        }
        if !self.fuel_budget.is_finite() {
            return Err(ConstructionError::InvalidConfig(format!(
                "fuel_budget must be finite, got {}",
                self.fuel_budget
            ))
            .into());
        }
        Ok(())
    }
}
