pub mod asc;
mod corridor;
mod crs;
mod error;
mod graph;
mod profile;
mod search;
mod session;
mod simplify;
mod source;
mod tiles;
mod tracer;
mod transform;
mod window;

#[cfg(test)]
mod fixtures;

pub use crate::{
    corridor::Corridor,
    crs::{AffineCrs, Crs, CrsTransform, Identity},
    error::RidgeError,
    graph::{CostModel, GridGraph, GridNode},
    profile::ElevationProfile,
    search::{find_path, PathResult},
    session::{Mode, RidgeSession, Simplification, State, DEFAULT_SIMPLIFY_TOLERANCE},
    simplify::simplify_preserving_apex,
    source::{sample_elevation, ElevationSource, MemRaster, RasterWindow},
    tiles::{TileMode, TileSet, METRES_PER_DEGREE},
    tracer::{Proposer, Tracer, TracerBuilder, DEFAULT_CAP_SEGMENTS, DEFAULT_CORRIDOR_RADIUS},
    transform::GeoTransform,
    window::{sample_window, ElevationSample, SampleGrid, MAX_WINDOW_SAMPLES},
};
pub use geo;
