use crate::{
    corridor::Corridor,
    crs::{Crs, CrsTransform, Identity},
    graph::{CostModel, GridGraph},
    profile::ElevationProfile,
    search::{find_path, PathResult},
    simplify::simplify_preserving_apex,
    source::{sample_elevation, ElevationSource},
    window::sample_window,
    RidgeError,
};
use geo::geometry::{Coord, LineString};
use log::debug;

/// Buffer around the segment between two query points, in query CRS
/// units.
pub const DEFAULT_CORRIDOR_RADIUS: f64 = 20.0;

/// Chords per round corridor cap.
pub const DEFAULT_CAP_SEGMENTS: usize = 8;

/// Computes proposed paths between two points.
pub trait Proposer {
    fn propose(&self, start: Coord, end: Coord) -> Result<LineString, RidgeError>;

    fn simplify(&self, line: &LineString, tolerance: f64) -> Result<LineString, RidgeError>;
}

impl<P: Proposer + ?Sized> Proposer for &P {
    fn propose(&self, start: Coord, end: Coord) -> Result<LineString, RidgeError> {
        (**self).propose(start, end)
    }

    fn simplify(&self, line: &LineString, tolerance: f64) -> Result<LineString, RidgeError> {
        (**self).simplify(line, tolerance)
    }
}

/// Traces ridge (or valley) paths over an elevation source.
pub struct Tracer<S, T = Identity> {
    source: S,
    transform: T,
    query_crs: Crs,
    radius: f64,
    cap_segments: usize,
    cost: CostModel,
}

impl Tracer<()> {
    pub fn builder() -> TracerBuilder {
        TracerBuilder::new()
    }
}

#[derive(Debug, Clone)]
pub struct TracerBuilder {
    radius: f64,
    cap_segments: usize,
    cost: CostModel,
    /// Defaults to the source's CRS.
    query_crs: Option<Crs>,
}

impl Default for TracerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TracerBuilder {
    pub fn new() -> Self {
        Self {
            radius: DEFAULT_CORRIDOR_RADIUS,
            cap_segments: DEFAULT_CAP_SEGMENTS,
            cost: CostModel::default(),
            query_crs: None,
        }
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn cap_segments(mut self, cap_segments: usize) -> Self {
        self.cap_segments = cap_segments;
        self
    }

    pub fn cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn query_crs(mut self, crs: Crs) -> Self {
        self.query_crs = Some(crs);
        self
    }

    pub fn build<S, T>(self, source: S, transform: T) -> Result<Tracer<S, T>, RidgeError>
    where
        S: ElevationSource,
        T: CrsTransform,
    {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(RidgeError::Builder("radius"));
        }
        if self.cap_segments == 0 {
            return Err(RidgeError::Builder("cap_segments"));
        }
        let query_crs = self.query_crs.unwrap_or_else(|| source.crs().clone());
        Ok(Tracer {
            source,
            transform,
            query_crs,
            radius: self.radius,
            cap_segments: self.cap_segments,
            cost: self.cost,
        })
    }
}

impl<S, T> Tracer<S, T>
where
    S: ElevationSource,
    T: CrsTransform,
{
    /// Returns the cheapest path from `start` to `end` through the
    /// cells of their corridor.
    pub fn trace(&self, start: Coord, end: Coord) -> Result<PathResult, RidgeError> {
        let corridor = Corridor::new(start, end, self.radius, self.cap_segments)?;

        let (grid, window_runtime) = {
            let now = std::time::Instant::now();
            let grid = sample_window(&self.source, &self.transform, &self.query_crs, &corridor)?;
            (grid, now.elapsed())
        };

        let (graph, graph_runtime) = {
            let now = std::time::Instant::now();
            let graph = GridGraph::build(&grid, &corridor, self.cost);
            (graph, now.elapsed())
        };

        let (path, search_runtime) = {
            let now = std::time::Instant::now();
            let path = find_path(&graph, start, end);
            (path, now.elapsed())
        };

        debug!(
            "trace; samples: {}, nodes: {}, window_exec: {:?}, graph_exec: {:?}, search_exec: {:?}",
            grid.samples().len(),
            graph.node_count(),
            window_runtime,
            graph_runtime,
            search_runtime
        );

        path
    }

    /// Returns the elevation under `coord`, given in the query CRS.
    pub fn elevation_at(&self, coord: Coord) -> Result<Option<f64>, RidgeError> {
        sample_elevation(&self.source, &self.transform, &self.query_crs, coord)
    }

    /// Simplifies `line` without losing its highest vertex.
    pub fn simplify(&self, line: &LineString, tolerance: f64) -> Result<LineString, RidgeError> {
        simplify_preserving_apex(line, tolerance, |coord| self.elevation_at(coord))
    }

    pub fn profile(&self, line: &LineString) -> Result<ElevationProfile, RidgeError> {
        ElevationProfile::along(line, &self.source, &self.query_crs, &self.transform)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn query_crs(&self) -> &Crs {
        &self.query_crs
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn cap_segments(&self) -> usize {
        self.cap_segments
    }

    pub fn cost(&self) -> CostModel {
        self.cost
    }
}

impl<S, T> Proposer for Tracer<S, T>
where
    S: ElevationSource,
    T: CrsTransform,
{
    fn propose(&self, start: Coord, end: Coord) -> Result<LineString, RidgeError> {
        self.trace(start, end).map(|path| path.line)
    }

    fn simplify(&self, line: &LineString, tolerance: f64) -> Result<LineString, RidgeError> {
        Tracer::simplify(self, line, tolerance)
    }
}
