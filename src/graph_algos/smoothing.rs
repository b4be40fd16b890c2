use crate::geometry::Point;
use crate::graph::{GraphModel, VertexId};
use crate::route::Route;


/// Visibility test between two world positions
pub trait LineOfSight {
    fn is_visible(&self, from: &Point, to: &Point) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(&Point, &Point) -> bool,
{
    fn is_visible(&self, from: &Point, to: &Point) -> bool {
        self(from, to)
    }
}


/// Line of sight over the walkability mask.
///
/// Samples the segment every quarter cell; the segment is clear when every
/// sample rounds to a walkable cell.
pub struct GridSight<'g> {
    graph: &'g GraphModel,
}

impl<'g> GridSight<'g> {
    pub fn new(graph: &'g GraphModel) -> Self {
        Self { graph }
    }
}

impl LineOfSight for GridSight<'_> {
    fn is_visible(&self, from: &Point, to: &Point) -> bool {
        let cell_size = self.graph.cell_size();
        let samples = (from.distance_to(to) / (cell_size / 4.0)).ceil() as usize;

        (0..=samples).all(|i| {
            let t = if samples == 0 { 0.0 } else { i as f64 / samples as f64 };
            let point = from.lerp(to, t);
            let row = (point.y / cell_size).round() as isize;
            let col = (point.x / cell_size).round() as isize;
            self.graph.is_walkable(row, col)
        })
    }
}


/// Drops the route vertices a mover can skip by walking straight.
///
/// Keeps the first vertex, then every vertex after which the next one is no
/// longer visible from the last kept turning point, then the last vertex.
/// A vertex where the route doubles back is always a turning point, so a
/// round trip keeps the stop it turned around at. Order is preserved; the
/// destination is never dropped.
pub struct PathSmoother<'g, L> {
    graph: &'g GraphModel,
    sight: L,
}

impl<'g, L: LineOfSight> PathSmoother<'g, L> {

    pub fn new(graph: &'g GraphModel, sight: L) -> Self {
        Self { graph, sight }
    }

    /// Smoothed copy of `route`; the cost is carried over unchanged
    pub fn smooth(&self, route: &Route) -> Route {
        let steps = route.steps();
        if steps.len() <= 2 {
            return route.clone();
        }

        let mut kept = vec![steps[0]];
        let mut anchor = steps[0];
        for triple in steps.windows(3) {
            let (before, previous, candidate) = (triple[0], triple[1], triple[2]);
            let doubles_back = candidate == before;
            if (doubles_back || !self.visible(anchor, candidate)) && previous != anchor {
                kept.push(previous);
                anchor = previous;
            }
        }

        // origin and destination both stay, even when they are the same vertex
        if let Some(&last) = steps.last() {
            if kept.len() < 2 || kept.last() != Some(&last) {
                kept.push(last);
            }
        }

        tracing::debug!(before = steps.len(), after = kept.len(), "smoothed route");
        Route::from_steps(kept, route.cost())
    }

    /// Unknown vertices are never visible, so they stay as turning points
    fn visible(&self, from: VertexId, to: VertexId) -> bool {
        match (self.graph.vertex(from), self.graph.vertex(to)) {
            (Some(a), Some(b)) => self.sight.is_visible(&a.position, &b.position),
            _ => false,
        }
    }
}
