//! Weighted 8-connected graphs over sampled cells.

use crate::{corridor::Corridor, window::SampleGrid};
use geo::geometry::Coord;
use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};

/// Which terrain feature a path should follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostModel {
    /// Prefer high cells.
    #[default]
    Ridge,
    /// Prefer low cells (thalwegs).
    Valley,
}

impl CostModel {
    /// Weight of an edge entering a cell at `elevation`.
    pub fn weight(self, elevation: f64) -> f64 {
        match self {
            Self::Ridge => -elevation,
            Self::Valley => elevation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNode {
    /// Raster row.
    pub row: usize,
    /// Raster column.
    pub col: usize,
    pub elevation: f64,
    /// Cell center, in the query CRS.
    pub coord: Coord,
}

/// Directed graph of the corridor's cells.
///
/// Edges join cells that touch by side or corner and carry the cost
/// model's weight of their target cell.
#[derive(Debug, Clone)]
pub struct GridGraph {
    graph: DiGraph<GridNode, f64>,
    cost: CostModel,
}

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl GridGraph {
    /// Builds the graph of `grid` samples which have an elevation and
    /// lie inside `corridor`.
    ///
    /// Nodes are inserted in row-major order.
    pub fn build(grid: &SampleGrid, corridor: &Corridor, cost: CostModel) -> Self {
        let (rows, cols) = (grid.rows(), grid.cols());
        let mut graph = DiGraph::new();
        let mut index: Vec<Option<NodeIndex>> = vec![None; rows * cols];

        for (slot, sample) in index.iter_mut().zip(grid.samples()) {
            if let Some(elevation) = sample.elevation {
                if corridor.contains(sample.coord) {
                    *slot = Some(graph.add_node(GridNode {
                        row: sample.row,
                        col: sample.col,
                        elevation,
                        coord: sample.coord,
                    }));
                }
            }
        }

        for row in 0..rows {
            for col in 0..cols {
                let Some(src) = index[row * cols + col] else {
                    continue;
                };
                for (dr, dc) in NEIGHBORS {
                    let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc))
                    else {
                        continue;
                    };
                    if r >= rows || c >= cols {
                        continue;
                    }
                    if let Some(dst) = index[r * cols + c] {
                        let weight = cost.weight(graph[dst].elevation);
                        graph.add_edge(src, dst, weight);
                    }
                }
            }
        }

        debug!(
            "graph; nodes: {}, edges: {}, cost: {cost:?}",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, cost }
    }

    pub fn graph(&self) -> &DiGraph<GridNode, f64> {
        &self.graph
    }

    pub fn cost(&self) -> CostModel {
        self.cost
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.graph.node_weights()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&GridNode> {
        self.graph.node_weight(idx)
    }

    /// Returns the node closest to `coord`.
    ///
    /// Ties go to the node inserted first.
    pub fn nearest(&self, coord: Coord) -> Option<NodeIndex> {
        let mut best: Option<(NodeIndex, f64)> = None;
        for idx in self.graph.node_indices() {
            let c = self.graph[idx].coord;
            let d2 = (c.x - coord.x).powi(2) + (c.y - coord.y).powi(2);
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((idx, d2));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Smallest edge weight, `None` for an edgeless graph.
    pub fn min_weight(&self) -> Option<f64> {
        self.graph.edge_weights().copied().reduce(f64::min)
    }

    /// Weight of the edge `from`→`to`, if the two are adjacent.
    #[cfg(test)]
    fn edge_weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{CostModel, GridGraph};
    use crate::{corridor::Corridor, crs::Identity, fixtures, window::sample_window};
    use geo::coord;

    fn build(raster: &crate::source::MemRaster, radius: f64, cost: CostModel) -> GridGraph {
        let corridor = Corridor::new(
            coord!(x: 0.5, y: 0.5),
            coord!(x: 0.5, y: 2.5),
            radius,
            16,
        )
        .unwrap();
        let grid = sample_window(raster, &Identity, &fixtures::crs(), &corridor).unwrap();
        GridGraph::build(&grid, &corridor, cost)
    }

    #[test]
    fn test_full_grid() {
        let raster = fixtures::uniform(3, 10.0);
        let graph = build(&raster, 20.0, CostModel::Ridge);
        assert_eq!(graph.node_count(), 9);
        // 12 side pairs and 8 corner pairs, in both directions.
        assert_eq!(graph.edge_count(), 40);
        assert_eq!(graph.min_weight(), Some(-10.0));
        let cells: Vec<_> = graph.nodes().map(|n| (n.row, n.col)).collect();
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (0, 1));
        assert_eq!(cells[8], (2, 2));
    }

    #[test]
    fn test_destination_weight() {
        let raster = fixtures::raster(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let graph = build(&raster, 20.0, CostModel::Ridge);
        let a = graph.nearest(coord!(x: 0.5, y: 1.5)).unwrap();
        let d = graph.nearest(coord!(x: 1.5, y: 0.5)).unwrap();
        assert_eq!(graph.edge_weight(a, d), Some(-4.0));
        assert_eq!(graph.edge_weight(d, a), Some(-1.0));

        let graph = build(&raster, 20.0, CostModel::Valley);
        assert_eq!(graph.edge_weight(a, d), Some(4.0));
        assert_eq!(graph.min_weight(), Some(1.0));
    }

    #[test]
    fn test_missing_cells_are_excluded() {
        let nan = f64::NAN;
        let raster = fixtures::raster(&[&[1.0, nan, 1.0], &[nan, nan, nan], &[1.0, nan, 1.0]]);
        let graph = build(&raster, 20.0, CostModel::Ridge);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.min_weight(), None);
    }

    #[test]
    fn test_corridor_excludes_cells() {
        let raster = fixtures::uniform(3, 5.0);
        // Only the west column's centers lie within 0.6 of x = 0.5.
        let graph = build(&raster, 0.6, CostModel::Ridge);
        assert_eq!(graph.node_count(), 3);
        assert!(graph.nodes().all(|n| n.col == 0));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_nearest_ties_go_to_first() {
        let raster = fixtures::uniform(2, 5.0);
        let graph = build(&raster, 20.0, CostModel::Ridge);
        let idx = graph.nearest(coord!(x: 1.0, y: 1.0)).unwrap();
        let node = graph.node(idx).unwrap();
        assert_eq!((node.row, node.col), (0, 0));
    }
}
