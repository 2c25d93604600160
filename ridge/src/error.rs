use crate::crs::Crs;
use nasadem::NasademError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RidgeError {
    #[error("raster window is empty")]
    EmptyWindow,

    #[error("no path between snapped endpoints")]
    NoPath,

    #[error("degenerate geometry: {0}")]
    InvalidGeometry(&'static str),

    #[error("window of size {size:?} exceeds {max} samples")]
    WindowTooLarge { size: (usize, usize), max: usize },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Nasadem(#[from] NasademError),

    #[error("no height files in {0}")]
    Path(PathBuf),

    #[error("ascii grid line {line}: {msg}")]
    AsciiGrid { line: usize, msg: String },

    #[error("window at {offset:?} of size {size:?} exceeds raster of size {raster:?}")]
    WindowBounds {
        offset: (usize, usize),
        size: (usize, usize),
        raster: (usize, usize),
    },

    #[error("geotransform is not invertible")]
    SingularTransform,

    #[error("no transform from {from} to {to}")]
    Crs { from: Crs, to: Crs },

    #[error("missing or invalid parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid session transition: {0}")]
    Transition(&'static str),
}

impl RidgeError {
    /// Returns `true` for "no usable result this time" conditions.
    ///
    /// Soft errors suppress a proposal. Everything else means the
    /// elevation data or the caller's configuration is unusable.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::EmptyWindow
                | Self::NoPath
                | Self::InvalidGeometry(_)
                | Self::WindowTooLarge { .. }
        )
    }
}
