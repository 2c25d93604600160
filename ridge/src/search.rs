//! Lowest-cost path search over a [`GridGraph`].

use crate::{graph::GridGraph, RidgeError};
use geo::geometry::{Coord, LineString};
use petgraph::algo::astar;

#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Cell centers along the path, in the query CRS.
    pub line: LineString,
    /// Raster (row, col) of each vertex of `line`.
    pub cells: Vec<(usize, usize)>,
    /// Sum of the graph's edge weights along the path.
    pub cost: f64,
}

/// Snaps `start` and `end` to their nearest nodes and returns the
/// cheapest path between them.
///
/// Every weight is offset by the graph's smallest weight before the
/// search so none is negative. Each step pays the same offset, so
/// among paths with equal vertex counts the order is unchanged.
pub fn find_path(graph: &GridGraph, start: Coord, end: Coord) -> Result<PathResult, RidgeError> {
    let from = graph.nearest(start).ok_or(RidgeError::NoPath)?;
    let to = graph.nearest(end).ok_or(RidgeError::NoPath)?;
    if from == to {
        return Err(RidgeError::NoPath);
    }
    let floor = graph.min_weight().ok_or(RidgeError::NoPath)?;

    // A zero heuristic makes A* plain Dijkstra.
    let (rebased, nodes) = astar(
        graph.graph(),
        from,
        |n| n == to,
        |e| *e.weight() - floor,
        |_| 0.0,
    )
    .ok_or(RidgeError::NoPath)?;

    #[allow(clippy::cast_precision_loss)]
    let cost = rebased + floor * (nodes.len() - 1) as f64;
    let (coords, cells): (Vec<Coord>, Vec<_>) = nodes
        .iter()
        .filter_map(|&idx| graph.node(idx))
        .map(|n| (n.coord, (n.row, n.col)))
        .unzip();

    Ok(PathResult {
        line: LineString::new(coords),
        cells,
        cost,
    })
}
