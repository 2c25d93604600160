//! Elevation data sources.

use crate::{
    crs::{Crs, CrsTransform},
    transform::GeoTransform,
    RidgeError,
};
use geo::geometry::Coord;

/// A rectangular block of samples read from an [`ElevationSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterWindow {
    /// Pixel (column, row) of the window's top-left sample.
    offset: (usize, usize),
    cols: usize,
    rows: usize,
    /// Row-major samples, `None` where the source has no data.
    values: Vec<Option<f64>>,
}

impl RasterWindow {
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly `cols * rows` samples.
    pub fn new(offset: (usize, usize), (cols, rows): (usize, usize), values: Vec<Option<f64>>) -> Self {
        assert_eq!(values.len(), cols * rows);
        Self {
            offset,
            cols,
            rows,
            values,
        }
    }

    pub fn offset(&self) -> (usize, usize) {
        self.offset
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the sample at window-relative `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col]
        } else {
            None
        }
    }
}

/// A read-only elevation raster.
pub trait ElevationSource {
    /// The CRS of [`Self::geo_transform`]'s world coordinates.
    fn crs(&self) -> &Crs;

    fn geo_transform(&self) -> GeoTransform;

    /// Returns (columns, rows).
    fn size(&self) -> (usize, usize);

    /// Reads `size` (columns, rows) samples starting at pixel `offset`
    /// (column, row).
    ///
    /// A window extending past the raster is an error.
    fn read_window(
        &self,
        offset: (usize, usize),
        size: (usize, usize),
    ) -> Result<RasterWindow, RidgeError>;

    /// Returns the sample of the cell containing `coord`, given in this
    /// source's CRS.
    fn elevation_at(&self, coord: Coord) -> Result<Option<f64>, RidgeError> {
        let px = self.geo_transform().invert()?.apply(coord.x, coord.y);
        let (cols, rows) = self.size();
        if !(px.x >= 0.0 && px.y >= 0.0) {
            return Ok(None);
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (px.x.floor() as usize, px.y.floor() as usize);
        if col >= cols || row >= rows {
            return Ok(None);
        }
        Ok(self.read_window((col, row), (1, 1))?.get(0, 0))
    }
}

impl<S: ElevationSource + ?Sized> ElevationSource for &S {
    fn crs(&self) -> &Crs {
        (**self).crs()
    }

    fn geo_transform(&self) -> GeoTransform {
        (**self).geo_transform()
    }

    fn size(&self) -> (usize, usize) {
        (**self).size()
    }

    fn read_window(
        &self,
        offset: (usize, usize),
        size: (usize, usize),
    ) -> Result<RasterWindow, RidgeError> {
        (**self).read_window(offset, size)
    }

    fn elevation_at(&self, coord: Coord) -> Result<Option<f64>, RidgeError> {
        (**self).elevation_at(coord)
    }
}

impl<S: ElevationSource + ?Sized> ElevationSource for Box<S> {
    fn crs(&self) -> &Crs {
        (**self).crs()
    }

    fn geo_transform(&self) -> GeoTransform {
        (**self).geo_transform()
    }

    fn size(&self) -> (usize, usize) {
        (**self).size()
    }

    fn read_window(
        &self,
        offset: (usize, usize),
        size: (usize, usize),
    ) -> Result<RasterWindow, RidgeError> {
        (**self).read_window(offset, size)
    }

    fn elevation_at(&self, coord: Coord) -> Result<Option<f64>, RidgeError> {
        (**self).elevation_at(coord)
    }
}

/// Returns the elevation under `coord`, given in `query_crs`.
pub fn sample_elevation<S, T>(
    source: &S,
    transform: &T,
    query_crs: &Crs,
    coord: Coord,
) -> Result<Option<f64>, RidgeError>
where
    S: ElevationSource + ?Sized,
    T: CrsTransform + ?Sized,
{
    let coord = if source.crs() == query_crs {
        coord
    } else {
        transform.transform_point(coord, query_crs, source.crs())?
    };
    source.elevation_at(coord)
}

pub(crate) fn check_window(
    offset: (usize, usize),
    size: (usize, usize),
    raster: (usize, usize),
) -> Result<(), RidgeError> {
    let fits = |off: usize, len: usize, max: usize| off.checked_add(len).is_some_and(|end| end <= max);
    if fits(offset.0, size.0, raster.0) && fits(offset.1, size.1, raster.1) {
        Ok(())
    } else {
        Err(RidgeError::WindowBounds {
            offset,
            size,
            raster,
        })
    }
}

/// An elevation raster held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemRaster {
    crs: Crs,
    transform: GeoTransform,
    cols: usize,
    rows: usize,
    /// Row-major samples, north row first for north-up transforms.
    values: Vec<f64>,
    nodata: Option<f64>,
}

impl MemRaster {
    /// Returns a raster of `cols` columns; `values.len()` must be a
    /// non-zero multiple of `cols`.
    pub fn new(
        crs: Crs,
        transform: GeoTransform,
        cols: usize,
        values: Vec<f64>,
    ) -> Result<Self, RidgeError> {
        if cols == 0 || values.is_empty() || values.len() % cols != 0 {
            return Err(RidgeError::Builder("values"));
        }
        transform.invert()?;
        let rows = values.len() / cols;
        Ok(Self {
            crs,
            transform,
            cols,
            rows,
            values,
            nodata: None,
        })
    }

    /// Treat samples equal to `nodata` as missing.
    #[must_use]
    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn value(&self, row: usize, col: usize) -> Option<f64> {
        let value = self.values[row * self.cols + col];
        #[allow(clippy::float_cmp)]
        if value.is_nan() || self.nodata == Some(value) {
            None
        } else {
            Some(value)
        }
    }
}

impl ElevationSource for MemRaster {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn geo_transform(&self) -> GeoTransform {
        self.transform
    }

    fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn read_window(
        &self,
        offset: (usize, usize),
        size: (usize, usize),
    ) -> Result<RasterWindow, RidgeError> {
        check_window(offset, size, self.size())?;
        let (col_off, row_off) = offset;
        let (cols, rows) = size;
        let values = (row_off..row_off + rows)
            .flat_map(|row| (col_off..col_off + cols).map(move |col| (row, col)))
            .map(|(row, col)| self.value(row, col))
            .collect();
        Ok(RasterWindow::new(offset, size, values))
    }
}

#[cfg(test)]
mod tests {
    use super::{sample_elevation, ElevationSource, MemRaster};
    use crate::{
        crs::{AffineCrs, Crs, Identity},
        transform::GeoTransform,
        RidgeError,
    };
    use geo::{coord, AffineTransform};

    fn raster() -> MemRaster {
        let values = vec![
            1.0, 2.0, 3.0, //
            4.0, f64::NAN, 6.0, //
            7.0, 8.0, -9999.0,
        ];
        MemRaster::new(
            Crs::epsg(2154),
            GeoTransform::north_up(coord!(x: 0.0, y: 30.0), 10.0, 10.0),
            3,
            values,
        )
        .unwrap()
        .with_nodata(-9999.0)
    }

    #[test]
    fn test_read_window() {
        let raster = raster();
        let window = raster.read_window((1, 0), (2, 3)).unwrap();
        assert_eq!((window.cols(), window.rows()), (2, 3));
        assert_eq!(window.get(0, 0), Some(2.0));
        assert_eq!(window.get(1, 0), None);
        assert_eq!(window.get(1, 1), Some(6.0));
        assert_eq!(window.get(2, 1), None);
        assert_eq!(window.get(3, 0), None);
    }

    #[test]
    fn test_read_window_out_of_bounds() {
        let raster = raster();
        assert!(matches!(
            raster.read_window((2, 2), (2, 1)),
            Err(RidgeError::WindowBounds { .. })
        ));
    }

    #[test]
    fn test_elevation_at() {
        let raster = raster();
        assert_eq!(raster.elevation_at(coord!(x: 5.0, y: 25.0)).unwrap(), Some(1.0));
        assert_eq!(raster.elevation_at(coord!(x: 29.9, y: 0.1)).unwrap(), None);
        assert_eq!(raster.elevation_at(coord!(x: 21.0, y: 1.0)).unwrap(), None);
        assert_eq!(raster.elevation_at(coord!(x: -1.0, y: 5.0)).unwrap(), None);
        assert_eq!(raster.elevation_at(coord!(x: 31.0, y: 5.0)).unwrap(), None);
        assert_eq!(raster.elevation_at(coord!(x: 15.0, y: 5.0)).unwrap(), Some(8.0));
    }

    #[test]
    fn test_sample_elevation_transforms_query() {
        let raster = raster();
        let local = Crs::new("LOCAL");
        let xform = AffineCrs::new().with(
            local.clone(),
            Crs::epsg(2154),
            AffineTransform::translate(-1000.0, -1000.0),
        );
        let elev = sample_elevation(&raster, &xform, &local, coord!(x: 1005.0, y: 1025.0));
        assert_eq!(elev.unwrap(), Some(1.0));
        assert!(sample_elevation(&raster, &Identity, &local, coord!(x: 5.0, y: 25.0)).is_err());
    }

    #[test]
    fn test_invalid_shape() {
        let gt = GeoTransform::north_up(coord!(x: 0.0, y: 0.0), 1.0, 1.0);
        assert!(MemRaster::new(Crs::epsg(2154), gt, 2, vec![1.0; 3]).is_err());
        assert!(MemRaster::new(Crs::epsg(2154), gt, 0, vec![]).is_err());
    }
}
