//! NASADEM file aggregator.

use crate::{
    crs::Crs,
    source::{check_window, ElevationSource, RasterWindow},
    transform::GeoTransform,
    RidgeError,
};
use dashmap::DashMap;
use geo::geometry::Coord;
use log::debug;
use nasadem::{NasademError, Tile, ARCSEC_PER_DEG};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Approximate length of one degree of latitude, in metres.
pub const METRES_PER_DEGREE: f64 = 111_320.0;

/// A global geographic elevation raster backed by a directory of
/// NASADEM tiles.
///
/// Pixel (0, 0) is centered on (-180°, 90°) and the grid steps
/// `arcseconds` per pixel, so sample centers line up with every
/// tile's samples.
pub struct TileSet {
    /// Directory containing NASADEM HGT tile files.
    tile_dir: PathBuf,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    /// Arcseconds per sample.
    arcseconds: u8,

    crs: Crs,

    /// Tiles which have been loaded on demand.
    tiles: DashMap<Coord<i16>, Arc<Tile>>,
}

impl TileSet {
    pub fn new(tile_dir: PathBuf, tile_mode: TileMode, arcseconds: u8) -> Result<Self, RidgeError> {
        if !matches!(arcseconds, 1 | 3) {
            return Err(RidgeError::Builder("arcseconds"));
        }

        let mut has_height_files = false;

        // Let's try to fail early be checking that tile_dir has at
        // least one `hgt` file.
        for entry in std::fs::read_dir(&tile_dir)? {
            let path = entry?.path();
            if path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("hgt"))
            {
                has_height_files = true;
                break;
            }
        }

        if has_height_files {
            Ok(Self {
                tile_dir,
                tile_mode,
                arcseconds,
                crs: Crs::wgs84(),
                tiles: DashMap::new(),
            })
        } else {
            Err(RidgeError::Path(tile_dir))
        }
    }

    /// Returns the tile containiong `coord`.
    ///
    /// Tiles are loaded from disk on first use. A tile missing from
    /// disk is replaced by a tombstone whose samples are all voids.
    pub fn tile(&self, coord: Coord) -> Result<Arc<Tile>, RidgeError> {
        let sw_corner = sw_corner(coord);
        self.tiles
            .entry(sw_corner)
            .or_try_insert_with(|| match self.load_tile(sw_corner) {
                Ok(tile) => Ok(Arc::new(tile)),
                Err(RidgeError::Nasadem(NasademError::Io(e))) if e.kind() == ErrorKind::NotFound => {
                    debug!("loading tombstone in lieu of missing tile for {sw_corner:?}");
                    Ok(Arc::new(Tile::tombstone(sw_corner, self.arcseconds)?))
                }
                Err(e) => Err(e),
            })
            .map(|r| r.clone())
    }

    fn samples_per_degree(&self) -> usize {
        3600 / usize::from(self.arcseconds)
    }

    fn load_tile(&self, sw_corner: Coord<i16>) -> Result<Tile, RidgeError> {
        let tile_path = {
            let file_name = file_name(sw_corner);
            let mut tile_path: PathBuf = [&self.tile_dir, Path::new(&file_name)].iter().collect();
            if !tile_path.exists() {
                let file_name = file_name.to_lowercase();
                tile_path = [&self.tile_dir, Path::new(&file_name)].iter().collect();
            }
            tile_path
        };
        debug!("loading {tile_path:?}");
        match self.tile_mode {
            TileMode::InMem => Ok(Tile::load(tile_path)?),
            TileMode::MemMap => Ok(Tile::memmap(tile_path)?),
        }
    }
}

impl ElevationSource for TileSet {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn geo_transform(&self) -> GeoTransform {
        let step = f64::from(self.arcseconds) / ARCSEC_PER_DEG;
        let top_left = Coord {
            x: -180.0 - step / 2.0,
            y: 90.0 + step / 2.0,
        };
        GeoTransform::north_up(top_left, step, step)
    }

    fn size(&self) -> (usize, usize) {
        let spd = self.samples_per_degree();
        (360 * spd + 1, 180 * spd + 1)
    }

    fn read_window(
        &self,
        offset: (usize, usize),
        size: (usize, usize),
    ) -> Result<RasterWindow, RidgeError> {
        check_window(offset, size, self.size())?;
        let gt = self.geo_transform();
        let (col_off, row_off) = offset;
        let (cols, rows) = size;
        let mut values = Vec::with_capacity(cols * rows);
        let mut current: Option<(Coord<i16>, Arc<Tile>)> = None;
        for row in row_off..row_off + rows {
            for col in col_off..col_off + cols {
                let coord = gt.cell_center(row, col);
                let corner = sw_corner(coord);
                // Neighboring samples usually share a tile. Always
                // resolve by corner so shared tile edges read the same
                // no matter which tile was visited last.
                let tile = match &current {
                    Some((cached, tile)) if *cached == corner => Arc::clone(tile),
                    _ => {
                        let tile = self.tile(coord)?;
                        current = Some((corner, Arc::clone(&tile)));
                        tile
                    }
                };
                values.push(tile.elevation(coord).map(f64::from));
            }
        }
        Ok(RasterWindow::new(offset, size, values))
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Parse tile and load into memory.
    ///
    /// Note that this can consume gigabytes of RAM when loading many
    /// tiles.
    InMem,

    /// Memory map file contents.
    MemMap,
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for coord
fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let (n_s, lat) = {
        let lat = y.abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}
