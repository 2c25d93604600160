//! Raster window sampling around a corridor.

use crate::{
    corridor::Corridor,
    crs::{Crs, CrsTransform},
    source::ElevationSource,
    transform::GeoTransform,
    RidgeError,
};
use geo::geometry::Coord;
use log::debug;

/// Largest window, in samples, [`sample_window`] will read.
pub const MAX_WINDOW_SAMPLES: usize = 4_000_000;

/// One raster cell of a sampled window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    /// Raster row.
    pub row: usize,
    /// Raster column.
    pub col: usize,
    /// `None` where the source has no data.
    pub elevation: Option<f64>,
    /// Cell center, in the query CRS.
    pub coord: Coord,
}

/// Samples covering a corridor's bounding region.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    /// Raster (column, row) of the top-left sample.
    offset: (usize, usize),
    cols: usize,
    rows: usize,
    /// Window-local pixel to raster CRS mapping.
    transform: GeoTransform,
    /// Row-major.
    samples: Vec<ElevationSample>,
}

impl SampleGrid {
    pub fn offset(&self) -> (usize, usize) {
        self.offset
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    pub fn samples(&self) -> &[ElevationSample] {
        &self.samples
    }

    /// Returns the sample at raster `(row, col)`, if inside the window.
    pub fn get(&self, row: usize, col: usize) -> Option<&ElevationSample> {
        let (col_off, row_off) = self.offset;
        let local_row = row.checked_sub(row_off)?;
        let local_col = col.checked_sub(col_off)?;
        if local_row < self.rows && local_col < self.cols {
            self.samples.get(local_row * self.cols + local_col)
        } else {
            None
        }
    }
}

/// Reads the samples under `corridor`'s bounding region.
///
/// Only the region is transformed into the source's CRS. The pixel
/// window is grown outward to whole pixels and clamped to the raster.
/// Windows over [`MAX_WINDOW_SAMPLES`] are refused before any sample is
/// read.
pub fn sample_window<S, T>(
    source: &S,
    transform: &T,
    query_crs: &Crs,
    corridor: &Corridor,
) -> Result<SampleGrid, RidgeError>
where
    S: ElevationSource + ?Sized,
    T: CrsTransform + ?Sized,
{
    let raster_crs = source.crs();
    let same_crs = raster_crs == query_crs;
    let region = if same_crs {
        corridor.bounding_rect()
    } else {
        transform.transform_rect(corridor.bounding_rect(), query_crs, raster_crs)?
    };

    let gt = source.geo_transform();
    let inverse = gt.invert()?;
    let (min, max) = (region.min(), region.max());
    let corners = [
        inverse.apply(min.x, max.y),
        inverse.apply(max.x, max.y),
        inverse.apply(max.x, min.y),
        inverse.apply(min.x, min.y),
    ];
    let (px_min, px_max) = corners.iter().fold(
        (
            Coord {
                x: f64::INFINITY,
                y: f64::INFINITY,
            },
            Coord {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
            },
        ),
        |(lo, hi), c| {
            (
                Coord {
                    x: lo.x.min(c.x),
                    y: lo.y.min(c.y),
                },
                Coord {
                    x: hi.x.max(c.x),
                    y: hi.y.max(c.y),
                },
            )
        },
    );

    let (raster_cols, raster_rows) = source.size();
    let col_start = clamp_px(px_min.x.floor(), raster_cols);
    let col_end = clamp_px(px_max.x.ceil(), raster_cols);
    let row_start = clamp_px(px_min.y.floor(), raster_rows);
    let row_end = clamp_px(px_max.y.ceil(), raster_rows);
    if col_end <= col_start || row_end <= row_start {
        return Err(RidgeError::EmptyWindow);
    }

    let offset = (col_start, row_start);
    let size = (col_end - col_start, row_end - row_start);
    if size.0.saturating_mul(size.1) > MAX_WINDOW_SAMPLES {
        return Err(RidgeError::WindowTooLarge {
            size,
            max: MAX_WINDOW_SAMPLES,
        });
    }
    let window = source.read_window(offset, size)?;
    let local = gt.shifted(col_start, row_start);

    let (cols, rows) = size;
    let mut samples = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let center = local.cell_center(row, col);
            let coord = if same_crs {
                center
            } else {
                transform.transform_point(center, raster_crs, query_crs)?
            };
            samples.push(ElevationSample {
                row: row_start + row,
                col: col_start + col,
                elevation: window.get(row, col),
                coord,
            });
        }
    }

    debug!("window; offset: {offset:?}, size: {size:?}");

    Ok(SampleGrid {
        offset,
        cols,
        rows,
        transform: local,
        samples,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn clamp_px(px: f64, max: usize) -> usize {
    if px.is_nan() {
        0
    } else {
        px.clamp(0.0, max as f64) as usize
    }
}
