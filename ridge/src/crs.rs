//! Coordinate reference systems and the transform service contract.

use crate::RidgeError;
use geo::{
    geometry::{Coord, Rect},
    AffineTransform,
};
use std::{collections::HashMap, fmt};

/// An opaque CRS identifier, e.g. `EPSG:2154`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs(String);

impl Crs {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn epsg(code: u32) -> Self {
        Self(format!("EPSG:{code}"))
    }

    /// Geographic WGS84, the CRS of NASADEM tiles.
    pub fn wgs84() -> Self {
        Self::epsg(4326)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transforms coordinates between CRSs.
pub trait CrsTransform {
    fn transform_point(&self, coord: Coord, from: &Crs, to: &Crs) -> Result<Coord, RidgeError>;

    /// Returns the envelope of `rect`'s transformed corners.
    fn transform_rect(&self, rect: Rect, from: &Crs, to: &Crs) -> Result<Rect, RidgeError> {
        let (min, max) = (rect.min(), rect.max());
        let corners = [
            min,
            Coord { x: max.x, y: min.y },
            max,
            Coord { x: min.x, y: max.y },
        ];
        let mut lo = Coord {
            x: f64::INFINITY,
            y: f64::INFINITY,
        };
        let mut hi = Coord {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
        };
        for corner in corners {
            let c = self.transform_point(corner, from, to)?;
            lo.x = lo.x.min(c.x);
            lo.y = lo.y.min(c.y);
            hi.x = hi.x.max(c.x);
            hi.y = hi.y.max(c.y);
        }
        Ok(Rect::new(lo, hi))
    }
}

impl<T: CrsTransform + ?Sized> CrsTransform for &T {
    fn transform_point(&self, coord: Coord, from: &Crs, to: &Crs) -> Result<Coord, RidgeError> {
        (**self).transform_point(coord, from, to)
    }

    fn transform_rect(&self, rect: Rect, from: &Crs, to: &Crs) -> Result<Rect, RidgeError> {
        (**self).transform_rect(rect, from, to)
    }
}

/// Passes coordinates through and rejects every pair of distinct CRSs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl CrsTransform for Identity {
    fn transform_point(&self, coord: Coord, from: &Crs, to: &Crs) -> Result<Coord, RidgeError> {
        if from == to {
            Ok(coord)
        } else {
            Err(RidgeError::Crs {
                from: from.clone(),
                to: to.clone(),
            })
        }
    }

    fn transform_rect(&self, rect: Rect, from: &Crs, to: &Crs) -> Result<Rect, RidgeError> {
        self.transform_point(rect.min(), from, to)?;
        Ok(rect)
    }
}

/// Affine transforms registered per (from, to) pair.
///
/// Each direction must be registered separately.
#[derive(Debug, Clone, Default)]
pub struct AffineCrs {
    transforms: HashMap<(Crs, Crs), AffineTransform<f64>>,
}

impl AffineCrs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, from: Crs, to: Crs, transform: AffineTransform<f64>) -> Self {
        self.transforms.insert((from, to), transform);
        self
    }
}

impl CrsTransform for AffineCrs {
    fn transform_point(&self, coord: Coord, from: &Crs, to: &Crs) -> Result<Coord, RidgeError> {
        if from == to {
            return Ok(coord);
        }
        self.transforms
            .get(&(from.clone(), to.clone()))
            .map(|transform| transform.apply(coord))
            .ok_or_else(|| RidgeError::Crs {
                from: from.clone(),
                to: to.clone(),
            })
    }
}
