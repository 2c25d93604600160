use crate::RidgeError;
use geo::{
    geometry::{Coord, LineString, Point, Polygon, Rect},
    Contains,
};
use std::f64::consts::{FRAC_PI_2, PI};

/// The buffered segment between two query points.
///
/// Only raster cells whose centers fall inside the corridor take part
/// in a path search.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    start: Coord,
    end: Coord,
    radius: f64,
    polygon: Polygon,
}

impl Corridor {
    /// Returns the `radius` buffer around `start`→`end`, with each
    /// round cap approximated by `cap_segments` chords.
    ///
    /// A zero-length segment has no corridor and yields
    /// [`RidgeError::EmptyWindow`].
    pub fn new(
        start: Coord,
        end: Coord,
        radius: f64,
        cap_segments: usize,
    ) -> Result<Self, RidgeError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RidgeError::InvalidGeometry("corridor radius"));
        }
        if cap_segments == 0 {
            return Err(RidgeError::InvalidGeometry("corridor cap segments"));
        }
        if ![start.x, start.y, end.x, end.y].iter().all(|v| v.is_finite()) {
            return Err(RidgeError::InvalidGeometry("non-finite endpoint"));
        }
        if start == end {
            return Err(RidgeError::EmptyWindow);
        }
        let polygon = stadium(start, end, radius, cap_segments);
        Ok(Self {
            start,
            end,
            radius,
            polygon,
        })
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn end(&self) -> Coord {
        self.end
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.polygon.contains(&Point::from(coord))
    }

    /// The segment's envelope grown by the radius on every side.
    pub fn bounding_rect(&self) -> Rect {
        let r = self.radius;
        Rect::new(
            Coord {
                x: self.start.x.min(self.end.x) - r,
                y: self.start.y.min(self.end.y) - r,
            },
            Coord {
                x: self.start.x.max(self.end.x) + r,
                y: self.start.y.max(self.end.y) + r,
            },
        )
    }
}

/// Counter-clockwise ring: the cap around `end`, then the cap around
/// `start`.
#[allow(clippy::cast_precision_loss)]
fn stadium(start: Coord, end: Coord, radius: f64, cap_segments: usize) -> Polygon {
    let heading = (end.y - start.y).atan2(end.x - start.x);
    let step = PI / cap_segments as f64;
    let arc = |center: Coord, from: f64| {
        (0..=cap_segments).map(move |i| {
            let angle = from + step * i as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
    };
    let ring: Vec<Coord> = arc(end, heading - FRAC_PI_2)
        .chain(arc(start, heading + FRAC_PI_2))
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::Corridor;
    use crate::RidgeError;
    use geo::{coord, Area};

    #[test]
    fn test_contains() {
        let corridor =
            Corridor::new(coord!(x: 0.0, y: 0.0), coord!(x: 100.0, y: 0.0), 20.0, 8).unwrap();
        assert!(corridor.contains(coord!(x: 50.0, y: 19.0)));
        assert!(corridor.contains(coord!(x: -15.0, y: 0.0)));
        assert!(corridor.contains(coord!(x: 110.0, y: -5.0)));
        assert!(!corridor.contains(coord!(x: 50.0, y: 21.0)));
        assert!(!corridor.contains(coord!(x: 121.0, y: 0.0)));
        // Outside the round cap, inside its bounding box.
        assert!(!corridor.contains(coord!(x: -19.0, y: 19.0)));
    }

    #[test]
    fn test_bounding_rect() {
        let corridor =
            Corridor::new(coord!(x: 10.0, y: 50.0), coord!(x: 0.0, y: 0.0), 5.0, 4).unwrap();
        let rect = corridor.bounding_rect();
        assert_eq!(rect.min(), coord!(x: -5.0, y: -5.0));
        assert_eq!(rect.max(), coord!(x: 15.0, y: 55.0));
    }

    #[test]
    fn test_area_approaches_stadium() {
        let corridor =
            Corridor::new(coord!(x: 0.0, y: 0.0), coord!(x: 0.0, y: 30.0), 10.0, 64).unwrap();
        let exact = 30.0 * 20.0 + std::f64::consts::PI * 100.0;
        let area = corridor.polygon().unsigned_area();
        assert!(area < exact && area > 0.99 * exact);
    }

    #[test]
    fn test_degenerate() {
        let p = coord!(x: 3.0, y: 4.0);
        assert!(matches!(
            Corridor::new(p, p, 20.0, 8),
            Err(RidgeError::EmptyWindow)
        ));
        assert!(matches!(
            Corridor::new(p, coord!(x: 0.0, y: 0.0), 0.0, 8),
            Err(RidgeError::InvalidGeometry(_))
        ));
        assert!(matches!(
            Corridor::new(p, coord!(x: f64::NAN, y: 0.0), 1.0, 8),
            Err(RidgeError::InvalidGeometry(_))
        ));
    }
}
