use crate::{
    crs::{Crs, CrsTransform},
    source::{sample_elevation, ElevationSource},
    RidgeError,
};
use geo::{
    algorithm::EuclideanDistance,
    geometry::{Coord, LineString, Point},
};
use log::debug;

/// Elevations along a polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationProfile {
    /// Planar distance from the first vertex, in query CRS units.
    pub distances: Vec<f64>,

    /// The polyline's vertices.
    pub points: Vec<Coord>,

    /// Elevation under each vertex, `None` where the source has no
    /// data.
    pub elevations: Vec<Option<f64>>,
}

impl ElevationProfile {
    /// Samples `source` under every vertex of `line`, which is given
    /// in `query_crs`.
    pub fn along<S, T>(
        line: &LineString,
        source: &S,
        query_crs: &Crs,
        transform: &T,
    ) -> Result<Self, RidgeError>
    where
        S: ElevationSource + ?Sized,
        T: CrsTransform + ?Sized,
    {
        let now = std::time::Instant::now();
        let points = line.0.clone();

        let mut distances = Vec::with_capacity(points.len());
        let mut total = 0.0;
        let mut prev: Option<Point> = None;
        for point in line.points() {
            if let Some(prev) = prev {
                total += prev.euclidean_distance(&point);
            }
            distances.push(total);
            prev = Some(point);
        }

        let elevations = points
            .iter()
            .map(|coord| sample_elevation(source, transform, query_crs, *coord))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "profile; len: {}, exec: {:?}",
            points.len(),
            now.elapsed()
        );

        Ok(Self {
            distances,
            points,
            elevations,
        })
    }

    /// Returns (distance, elevation) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.distances
            .iter()
            .copied()
            .zip(self.elevations.iter().copied())
    }

    pub fn total_distance(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ElevationProfile;
    use crate::{crs::Identity, fixtures};
    use assert_approx_eq::assert_approx_eq;
    use geo::line_string;

    #[test]
    fn test_profile() {
        let nan = f64::NAN;
        let raster = fixtures::raster(&[&[1.0, 2.0, 3.0], &[4.0, nan, 6.0]]);
        let line = line_string![
            (x: 0.5, y: 1.5),
            (x: 2.5, y: 1.5),
            (x: 2.5, y: 0.5),
            (x: 1.5, y: 0.5),
        ];
        let profile =
            ElevationProfile::along(&line, &raster, &fixtures::crs(), &Identity).unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(
            profile.elevations,
            vec![Some(1.0), Some(3.0), Some(6.0), None]
        );
        assert_approx_eq!(profile.total_distance(), 4.0);
        let pairs: Vec<_> = profile.pairs().collect();
        assert_eq!(pairs[1], (2.0, Some(3.0)));
        assert_eq!(pairs[3], (4.0, None));
    }

    #[test]
    fn test_off_raster_is_missing() {
        let raster = fixtures::uniform(2, 7.0);
        let line = line_string![(x: -5.0, y: 0.5), (x: 0.5, y: 0.5)];
        let profile =
            ElevationProfile::along(&line, &raster, &fixtures::crs(), &Identity).unwrap();
        assert_eq!(profile.elevations, vec![None, Some(7.0)]);
        assert_approx_eq!(profile.total_distance(), 5.5);
    }
}
