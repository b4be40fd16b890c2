use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fuelroute::{
    GraphModel, GridBuilder, GridSight, Heuristic, InfeasibleReason, MapMarkers, Neighborhood, PathSmoother,
    PlannerConfig, Point, RouteSolver, RouteStep, SolveMode, TourPlan, load_map,
};

/// Process exit codes
mod exit_codes {
    pub const UNREACHABLE: u8 = 2;
    pub const RESOURCE_INSUFFICIENT: u8 = 3;
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a fuel-constrained tour from the entry to the exit of a grid map")]
struct Cli {
    /// Map file to plan on.
    map: PathBuf,
    /// Fuel at the entry.
    #[arg(long)]
    fuel: Option<f64>,
    /// Station ordering: exact or nearest-insertion.
    #[arg(long)]
    mode: Option<SolveMode>,
    /// Neighbour scheme: four or eight.
    #[arg(long)]
    neighborhood: Option<Neighborhood>,
    /// A* heuristic: manhattan, euclidean, chebyshev or zero. Defaults to the one matching the neighbourhood.
    #[arg(long)]
    heuristic: Option<Heuristic>,
    /// Also print the route reduced to its turning points.
    #[arg(long)]
    smooth: bool,
    /// JSON planner config; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    plan: &'a TourPlan,
    steps: &'a [RouteStep],
    #[serde(skip_serializing_if = "Option::is_none")]
    smoothed: Option<Vec<Point>>,
}

#[derive(Serialize)]
struct Failure {
    infeasible: InfeasibleReason,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = planner_config(&cli)?;

    let grid = load_map(&cli.map).with_context(|| format!("failed to load map from {}", cli.map.display()))?;
    let mut markers = MapMarkers::default();
    let graph = GridBuilder::new(config.grid)
        .build(&grid, &mut markers)
        .context("failed to build a graph from the map")?;
    let entry = markers.entry.context("map has no entry cell (S)")?.0;
    let exit = markers.exit.context("map has no exit cell (E)")?.0;

    let solver = RouteSolver::new(&graph, config.solver);
    let plan = match solver.solve(graph.id_of(entry), graph.id_of(exit), config.fuel_budget, config.heuristic().as_fn()) {
        Ok(plan) => plan,
        Err(err) => match err.infeasible_reason() {
            Some(reason) => return report_infeasible(&graph, reason, config.fuel_budget, cli.json),
            None => return Err(err).context("route planning failed"),
        },
    };

    let steps = plan
        .route
        .fuel_trace(&graph, config.fuel_budget)
        .context("failed to trace fuel along the route")?;
    let smoothed = cli.smooth.then(|| {
        PathSmoother::new(&graph, GridSight::new(&graph))
            .smooth(&plan.route)
            .positions(&graph)
    });

    if cli.json {
        let report = Report { plan: &plan, steps: &steps, smoothed };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_plan(&graph, &plan, &steps, smoothed.as_deref());
    }

    Ok(ExitCode::SUCCESS)
}

fn planner_config(cli: &Cli) -> Result<PlannerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("failed to load planner config from {}", path.display()))?,
        None => PlannerConfig::default(),
    };

    if let Some(fuel) = cli.fuel {
        config.fuel_budget = fuel;
    }
    if let Some(mode) = cli.mode {
        config.solver.mode = mode;
    }
    if let Some(neighborhood) = cli.neighborhood {
        config.grid.neighborhood = neighborhood;
    }
    if let Some(heuristic) = cli.heuristic {
        config.heuristic = Some(heuristic);
    }

    config.validate().context("invalid planner config")?;
    Ok(config)
}

fn print_plan(graph: &GraphModel, plan: &TourPlan, steps: &[RouteStep], smoothed: Option<&[Point]>) {
    println!(
        "Tour ({}): {} stations, {} steps, cost {}, fuel left {}",
        plan.mode,
        plan.waypoint_order.len(),
        plan.route.len(),
        plan.route.cost(),
        plan.fuel_remaining
    );

    for step in steps {
        let coord = graph.coord_of(step.vertex).map_or_else(|| "?".to_string(), |coord| coord.to_string());
        let station = if plan.waypoint_order.contains(&step.vertex) { " station" } else { "" };
        println!("- {coord} fuel {:+} -> {}{station}", step.fuel_change, step.fuel_after);
    }

    if let Some(points) = smoothed {
        let turns: Vec<String> = points.iter().map(|p| format!("({}, {})", p.x, p.y)).collect();
        println!("Smoothed: {}", turns.join(" -> "));
    }
}

fn report_infeasible(graph: &GraphModel, reason: InfeasibleReason, fuel: f64, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(&Failure { infeasible: reason })?);
    }

    match reason {
        InfeasibleReason::Unreachable { vertex } => {
            let place = graph.coord_of(vertex).map_or_else(|| vertex.to_string(), |coord| coord.to_string());
            eprintln!("No tour: {place} cannot be reached from the entry.");
            Ok(ExitCode::from(exit_codes::UNREACHABLE))
        }
        InfeasibleReason::ResourceInsufficient => {
            eprintln!("No tour: {fuel} fuel is not enough for any station order; try a larger --fuel.");
            Ok(ExitCode::from(exit_codes::RESOURCE_INSUFFICIENT))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
