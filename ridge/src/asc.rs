//! ESRI ASCII grid (`.asc`) elevation models.
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     850000.0
//! yllcorner     6540000.0
//! cellsize      5.0
//! NODATA_value  -99999
//! 12.1 12.4 13.0 12.8
//! ...
//! ```
//!
//! Rows are listed north to south. `xllcenter`/`yllcenter` may replace
//! the corner keys, in which case they locate the center of the
//! south-west cell.

use crate::{crs::Crs, source::MemRaster, transform::GeoTransform, RidgeError};
use geo::geometry::Coord;
use log::debug;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Loads the grid at `path`, tagging it with `crs`.
pub fn load<P: AsRef<Path>>(path: P, crs: Crs) -> Result<MemRaster, RidgeError> {
    debug!("loading {:?}", path.as_ref());
    let file = File::open(path)?;
    parse(BufReader::new(file), crs)
}

pub fn parse<R: BufRead>(rdr: R, crs: Crs) -> Result<MemRaster, RidgeError> {
    let mut header = Header::default();
    let mut values = Vec::new();
    let mut last_line = 0;

    for (idx, line) in rdr.lines().enumerate() {
        let line = line?;
        last_line = idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if values.is_empty() && first.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let value = tokens
                .next()
                .ok_or_else(|| err(last_line, format!("missing value for '{first}'")))?;
            header.set(first, value, last_line)?;
        } else {
            for token in std::iter::once(first).chain(tokens) {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| err(last_line, format!("invalid sample '{token}'")))?;
                values.push(value);
            }
        }
    }

    let cols = header.ncols.ok_or_else(|| err(last_line, "missing ncols".into()))?;
    let rows = header.nrows.ok_or_else(|| err(last_line, "missing nrows".into()))?;
    let cellsize = header
        .cellsize
        .filter(|size| *size > 0.0)
        .ok_or_else(|| err(last_line, "missing or invalid cellsize".into()))?;
    let lower_left = header
        .lower_left(cellsize)
        .ok_or_else(|| err(last_line, "missing lower-left corner".into()))?;
    let expected = cols
        .checked_mul(rows)
        .filter(|&n| n > 0)
        .ok_or_else(|| err(last_line, format!("invalid grid size {cols}x{rows}")))?;
    if values.len() != expected {
        return Err(err(
            last_line,
            format!("expected {expected} samples, found {}", values.len()),
        ));
    }

    #[allow(clippy::cast_precision_loss)]
    let top_left = Coord {
        x: lower_left.x,
        y: lower_left.y + rows as f64 * cellsize,
    };
    let raster = MemRaster::new(
        crs,
        GeoTransform::north_up(top_left, cellsize, cellsize),
        cols,
        values,
    )?;
    Ok(match header.nodata {
        Some(nodata) => raster.with_nodata(nodata),
        None => raster,
    })
}

fn err(line: usize, msg: String) -> RidgeError {
    RidgeError::AsciiGrid { line, msg }
}

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl Header {
    fn set(&mut self, key: &str, value: &str, line: usize) -> Result<(), RidgeError> {
        let float = || {
            value
                .parse::<f64>()
                .map_err(|_| err(line, format!("invalid value '{value}' for '{key}'")))
        };
        let count = || {
            value
                .parse::<usize>()
                .map_err(|_| err(line, format!("invalid value '{value}' for '{key}'")))
        };
        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.ncols = Some(count()?),
            "nrows" => self.nrows = Some(count()?),
            "xllcorner" => self.xll = Some((float()?, false)),
            "xllcenter" => self.xll = Some((float()?, true)),
            "yllcorner" => self.yll = Some((float()?, false)),
            "yllcenter" => self.yll = Some((float()?, true)),
            "cellsize" => self.cellsize = Some(float()?),
            "nodata_value" => self.nodata = Some(float()?),
            _ => return Err(err(line, format!("unknown header '{key}'"))),
        }
        Ok(())
    }

    /// Outer lower-left corner of the grid.
    fn lower_left(&self, cellsize: f64) -> Option<Coord> {
        let corner = |(value, is_center): (f64, bool)| {
            if is_center {
                value - cellsize / 2.0
            } else {
                value
            }
        };
        Some(Coord {
            x: corner(self.xll?),
            y: corner(self.yll?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::{crs::Crs, source::ElevationSource, RidgeError};
    use geo::coord;

    const GRID: &str = "\
ncols 3
nrows 2
xllcorner 1000.0
yllcorner 2000.0
cellsize 5
NODATA_value -99999
1 2 3
4 -99999 6
";

    #[test]
    fn test_parse_corner() {
        let raster = parse(GRID.as_bytes(), Crs::epsg(2154)).unwrap();
        assert_eq!(raster.size(), (3, 2));
        assert_eq!(raster.geo_transform().cell_center(0, 0), coord!(x: 1002.5, y: 2007.5));
        assert_eq!(raster.elevation_at(coord!(x: 1002.5, y: 2007.5)).unwrap(), Some(1.0));
        assert_eq!(raster.elevation_at(coord!(x: 1007.5, y: 2002.5)).unwrap(), None);
        assert_eq!(raster.elevation_at(coord!(x: 1012.5, y: 2002.5)).unwrap(), Some(6.0));
    }

    #[test]
    fn test_parse_center() {
        let grid = "NCOLS 2\nNROWS 1\nXLLCENTER 2.5\nYLLCENTER 2.5\nCELLSIZE 5\n7 8\n";
        let raster = parse(grid.as_bytes(), Crs::epsg(2154)).unwrap();
        assert_eq!(raster.nodata(), None);
        assert_eq!(raster.geo_transform().cell_center(0, 1), coord!(x: 7.5, y: 2.5));
    }

    #[test]
    fn test_samples_may_wrap_lines() {
        let grid = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n4\n";
        let raster = parse(grid.as_bytes(), Crs::epsg(2154)).unwrap();
        assert_eq!(raster.elevation_at(coord!(x: 0.5, y: 0.5)).unwrap(), Some(3.0));
    }

    #[test]
    fn test_errors_carry_line() {
        let grid = GRID.replace("4 -99999 6", "4 x 6");
        match parse(grid.as_bytes(), Crs::epsg(2154)) {
            Err(RidgeError::AsciiGrid { line, .. }) => assert_eq!(line, 8),
            other => panic!("unexpected {other:?}"),
        }

        let grid = GRID.replace("4 -99999 6\n", "");
        assert!(matches!(
            parse(grid.as_bytes(), Crs::epsg(2154)),
            Err(RidgeError::AsciiGrid { .. })
        ));

        let grid = GRID.replace("cellsize 5", "cellsize -5");
        assert!(parse(grid.as_bytes(), Crs::epsg(2154)).is_err());
    }

    #[test]
    fn test_oversized_header() {
        let grid = GRID.replace("ncols 3", &format!("ncols {}", usize::MAX));
        assert!(matches!(
            parse(grid.as_bytes(), Crs::epsg(2154)),
            Err(RidgeError::AsciiGrid { .. })
        ));
        let grid = GRID.replace("nrows 2", "nrows 0");
        assert!(matches!(
            parse(grid.as_bytes(), Crs::epsg(2154)),
            Err(RidgeError::AsciiGrid { .. })
        ));
    }
}
