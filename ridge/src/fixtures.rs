//! Synthetic elevation data for tests.

use crate::{crs::Crs, source::MemRaster, transform::GeoTransform};
use byteorder::{WriteBytesExt, BE};
use geo::geometry::Coord;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

const HGT_3_ARCSEC_SIDE: usize = 1201;

pub fn crs() -> Crs {
    Crs::epsg(2154)
}

/// Returns a fresh directory unique to this process and `tag`.
pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ridge-{}-{tag}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes a single 3-arcsecond tile named `name` into a fresh
/// directory and returns the directory.
///
/// `f` receives (column, row counted from the north edge).
pub fn hgt_dir<F>(tag: &str, name: &str, f: F) -> PathBuf
where
    F: Fn(usize, usize) -> i16,
{
    let dir = temp_dir(tag);
    let mut wtr = BufWriter::new(File::create(dir.join(name)).unwrap());
    for row in 0..HGT_3_ARCSEC_SIDE {
        for col in 0..HGT_3_ARCSEC_SIDE {
            wtr.write_i16::<BE>(f(col, row)).unwrap();
        }
    }
    wtr.flush().unwrap();
    dir
}

/// Returns a raster with unit cells whose bottom-left corner is the
/// origin. `rows` are listed north to south.
#[allow(clippy::cast_precision_loss)]
pub fn raster<R: AsRef<[f64]>>(rows: &[R]) -> MemRaster {
    let cols = rows[0].as_ref().len();
    let values = rows
        .iter()
        .flat_map(|row| row.as_ref().iter().copied())
        .collect();
    let top_left = Coord {
        x: 0.0,
        y: rows.len() as f64,
    };
    MemRaster::new(crs(), GeoTransform::north_up(top_left, 1.0, 1.0), cols, values).unwrap()
}

/// 5x5 pyramid peaking at 100 on the center cell (2, 2), dropping 10
/// per ring.
#[allow(clippy::cast_precision_loss)]
pub fn peak_5x5() -> MemRaster {
    let mut values = Vec::with_capacity(25);
    for row in 0..5_i32 {
        for col in 0..5_i32 {
            let ring = (row - 2).abs().max((col - 2).abs());
            values.push(f64::from(100 - 10 * ring));
        }
    }
    let top_left = Coord { x: 0.0, y: 5.0 };
    MemRaster::new(crs(), GeoTransform::north_up(top_left, 1.0, 1.0), 5, values).unwrap()
}

/// `n` x `n` raster at constant `elevation`.
#[allow(clippy::cast_precision_loss)]
pub fn uniform(n: usize, elevation: f64) -> MemRaster {
    let top_left = Coord { x: 0.0, y: n as f64 };
    MemRaster::new(
        crs(),
        GeoTransform::north_up(top_left, 1.0, 1.0),
        n,
        vec![elevation; n * n],
    )
    .unwrap()
}
