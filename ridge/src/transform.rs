//! Affine mapping between raster pixel space and world coordinates.

use crate::RidgeError;
use geo::geometry::Coord;

/// GDAL-style six coefficient geotransform.
///
/// ```text
/// x = gt[0] + px * gt[1] + py * gt[2]
/// y = gt[3] + px * gt[4] + py * gt[5]
/// ```
///
/// where `(px, py)` is the (column, row) position in pixel space, and
/// `(0, 0)` is the top-left corner of the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self(coefficients)
    }

    /// Returns an unrotated transform with `top_left` as the outer
    /// corner of pixel (0, 0) and rows running south.
    pub fn north_up(top_left: Coord, cell_width: f64, cell_height: f64) -> Self {
        Self([top_left.x, cell_width, 0.0, top_left.y, 0.0, -cell_height])
    }

    /// Maps pixel-space `(px, py)` to world coordinates.
    pub fn apply(&self, px: f64, py: f64) -> Coord {
        let gt = &self.0;
        Coord {
            x: gt[0] + px * gt[1] + py * gt[2],
            y: gt[3] + px * gt[4] + py * gt[5],
        }
    }

    /// Returns the world coordinate of the center of cell `(row, col)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, row: usize, col: usize) -> Coord {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Returns the inverse transform, mapping world coordinates to
    /// pixel space.
    pub fn invert(&self) -> Result<Self, RidgeError> {
        let gt = &self.0;
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        if det == 0.0 || !det.is_finite() {
            return Err(RidgeError::SingularTransform);
        }
        let inv_det = 1.0 / det;
        Ok(Self([
            (gt[2] * gt[3] - gt[0] * gt[5]) * inv_det,
            gt[5] * inv_det,
            -gt[2] * inv_det,
            (-gt[1] * gt[3] + gt[0] * gt[4]) * inv_det,
            -gt[4] * inv_det,
            gt[1] * inv_det,
        ]))
    }

    /// Returns the transform of a window whose pixel (0, 0) is pixel
    /// `(col, row)` of `self`.
    #[allow(clippy::cast_precision_loss)]
    pub fn shifted(&self, col: usize, row: usize) -> Self {
        let origin = self.apply(col as f64, row as f64);
        let gt = &self.0;
        Self([origin.x, gt[1], gt[2], origin.y, gt[4], gt[5]])
    }
}

#[cfg(test)]
mod tests {
    use super::GeoTransform;
    use assert_approx_eq::assert_approx_eq;
    use geo::coord;

    #[test]
    fn test_cell_center() {
        let gt = GeoTransform::north_up(coord!(x: 1000.0, y: 2000.0), 5.0, 5.0);
        assert_eq!(gt.cell_center(0, 0), coord!(x: 1002.5, y: 1997.5));
        assert_eq!(gt.cell_center(2, 1), coord!(x: 1007.5, y: 1987.5));
    }

    #[test]
    fn test_invert_roundtrip() {
        let gt = GeoTransform::new([450_000.0, 25.0, 1.5, 6_300_000.0, -2.0, -25.0]);
        let inv = gt.invert().unwrap();
        let world = gt.apply(12.25, 7.75);
        let px = inv.apply(world.x, world.y);
        assert_approx_eq!(px.x, 12.25, 1e-9);
        assert_approx_eq!(px.y, 7.75, 1e-9);
    }

    #[test]
    fn test_singular() {
        let gt = GeoTransform::new([0.0, 1.0, 2.0, 0.0, 2.0, 4.0]);
        assert!(gt.invert().is_err());
    }

    #[test]
    fn test_shifted() {
        let gt = GeoTransform::north_up(coord!(x: 0.0, y: 10.0), 1.0, 1.0);
        let window = gt.shifted(3, 2);
        assert_eq!(window.cell_center(0, 0), gt.cell_center(2, 3));
        assert_eq!(window.apply(0.0, 0.0), coord!(x: 3.0, y: 8.0));
    }
}
