mod common;

use common::{level, random_level};
use fuelroute::{
    AStar, Error, Heuristic, InfeasibleReason, RouteSolver, SolveMode, SolverConfig, VertexId, dijkstra_route,
};
use rand::{SeedableRng, rngs::StdRng};

fn solver(graph: &fuelroute::GraphModel, mode: SolveMode) -> RouteSolver<'_> {
    RouteSolver::new(graph, SolverConfig { mode, ..SolverConfig::default() })
}

fn sorted(mut ids: Vec<VertexId>) -> Vec<VertexId> {
    ids.sort();
    ids
}

#[test]
fn open_five_by_five_takes_nine_steps() {
    let level = level("height 5\nwidth 5\nS....\n.....\n.....\n.....\n....E\n");
    let plan = solver(&level.graph, SolveMode::Exact)
        .solve(level.entry, level.exit, 50.0, Heuristic::Manhattan.as_fn())
        .expect("open grid has a tour");
    assert_eq!(plan.route.len(), 9);
    assert_eq!(plan.route.cost(), 8.0);
    assert_eq!(plan.fuel_remaining, 42.0);
}

#[test]
fn station_behind_walls_is_unreachable() {
    let level = level("height 4\nwidth 5\nS..rV\n...rr\n.V...\n....E\n");
    for mode in [SolveMode::Exact, SolveMode::NearestInsertion] {
        let result = solver(&level.graph, mode).solve(level.entry, level.exit, 100.0, Heuristic::Manhattan.as_fn());
        let expected = InfeasibleReason::Unreachable { vertex: level.at(0, 4) };
        match result {
            Err(Error::Infeasible(reason)) => assert_eq!(reason, expected, "{mode}"),
            other => panic!("{mode}: expected an unreachable station, got {other:?}"),
        }
    }
}

#[test]
fn budget_too_small_for_any_order() {
    let level = level("height 3\nwidth 7\nV.....H\n.......\n...SE..\n");
    for mode in [SolveMode::Exact, SolveMode::NearestInsertion] {
        let result = solver(&level.graph, mode).solve(level.entry, level.exit, 8.0, Heuristic::Manhattan.as_fn());
        assert!(
            matches!(result, Err(Error::Infeasible(InfeasibleReason::ResourceInsufficient))),
            "{mode}: {result:?}"
        );

        let plenty = solver(&level.graph, mode).solve(level.entry, level.exit, 40.0, Heuristic::Manhattan.as_fn());
        assert!(plenty.is_ok(), "{mode}: {plenty:?}");
    }
}

#[test]
fn fuel_cell_decides_the_order() {
    // V..S.gEH: visiting V first is cheaper (11) but runs dry before the fuel
    // cell; going right first refuels and costs 17
    let level = level("height 1\nwidth 8\nV..S.gEH\n");
    let plan = solver(&level.graph, SolveMode::Exact)
        .solve(level.entry, level.exit, 5.0, Heuristic::Manhattan.as_fn())
        .expect("refuelling order is feasible");
    assert_eq!(plan.waypoint_order, vec![level.at(0, 7), level.at(0, 0)]);
    assert_eq!(plan.route.cost(), 17.0);
    assert_eq!(plan.fuel_remaining, 18.0);

    let cheap = solver(&level.graph, SolveMode::Exact)
        .solve(level.entry, level.exit, 50.0, Heuristic::Manhattan.as_fn())
        .expect("plenty of fuel");
    assert_eq!(cheap.waypoint_order, vec![level.at(0, 0), level.at(0, 7)]);
    assert_eq!(cheap.route.cost(), 11.0);

    // nearest insertion settles on the cheap order and does not look further
    let approx = solver(&level.graph, SolveMode::NearestInsertion)
        .solve(level.entry, level.exit, 5.0, Heuristic::Manhattan.as_fn());
    assert!(matches!(approx, Err(Error::Infeasible(InfeasibleReason::ResourceInsufficient))));
}

#[test]
fn zero_stations_match_plain_search() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let level = random_level(&mut rng, 6, 6, 0, 0.2);
        let direct = AStar::new(&level.graph).find_path(level.entry, level.exit, Heuristic::Manhattan.as_fn());
        let plan = solver(&level.graph, SolveMode::Exact).solve(level.entry, level.exit, 1000.0, Heuristic::Manhattan.as_fn());
        let oracle = dijkstra_route(&level.graph, level.entry, level.exit);
        match (direct, plan) {
            (Ok(route), Ok(plan)) => {
                assert_eq!(plan.route, route);
                assert_eq!(plan.route.cost(), oracle.expect("dijkstra reaches the exit").cost());
            }
            (Err(Error::NotFound { .. }), Err(Error::Infeasible(InfeasibleReason::Unreachable { vertex }))) => {
                assert_eq!(vertex, level.exit);
                assert!(matches!(oracle, Err(Error::NotFound { .. })));
            }
            (direct, plan) => panic!("search {direct:?} disagrees with solver {plan:?}"),
        }
    }
}

#[test]
fn approximate_tours_never_beat_exact_ones() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut compared = 0;
    for _ in 0..40 {
        let level = random_level(&mut rng, 5, 6, 4, 0.15);
        let stations = sorted(level.graph.essential_vertices().map(|v| v.id).collect());

        let exact = solver(&level.graph, SolveMode::Exact).solve(level.entry, level.exit, 1000.0, Heuristic::Manhattan.as_fn());
        let approx = solver(&level.graph, SolveMode::NearestInsertion)
            .solve(level.entry, level.exit, 1000.0, Heuristic::Manhattan.as_fn());

        match (exact, approx) {
            (Ok(exact), Ok(approx)) => {
                assert!(approx.route.cost() >= exact.route.cost() - 1e-9);
                for plan in [&exact, &approx] {
                    assert_eq!(sorted(plan.waypoint_order.clone()), stations);
                    assert_eq!(plan.route.origin(), Some(level.entry));
                    assert_eq!(plan.route.destination(), Some(level.exit));
                    for &station in &stations {
                        assert!(plan.route.contains(station));
                    }
                }
                compared += 1;
            }
            (
                Err(Error::Infeasible(InfeasibleReason::Unreachable { .. })),
                Err(Error::Infeasible(InfeasibleReason::Unreachable { .. })),
            ) => {}
            (exact, approx) => panic!("modes disagree on feasibility: {exact:?} vs {approx:?}"),
        }
    }
    assert!(compared > 0);
}
