//! NASADEM evelation (`.hgt`) file format.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::NasademError;
use byteorder::{BigEndian as BE, ByteOrder, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

pub const ARCSEC_PER_DEG: C = 3600.0;

/// Raw sample value marking a void (no data) in HGT files.
pub const VOID: i16 = i16::MIN;

pub struct Tile {
    /// Southwest corner of the tile.
    ///
    /// Specificlly, the _center_ of the SW most sample of the tile.
    sw_corner_center: Coord<C>,

    /// Arcseconds per sample.
    resolution: u8,

    /// Number of (columns, rows) in this tile.
    dimensions: (usize, usize),

    /// Elevation samples, north row first.
    samples: SampleStore,
}

enum SampleStore {
    Tombstone,
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> i16 {
        match self {
            Self::Tombstone => VOID,
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * size_of::<u16>();
                BE::read_i16(&raw[start..start + size_of::<u16>()])
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions @ (cols, rows)) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let mut file = BufReader::new(File::open(path)?);

        let samples = {
            let mut sample_store = Vec::with_capacity(cols * rows);
            for _ in 0..(cols * rows) {
                sample_store.push(file.read_i16::<BE>()?);
            }
            SampleStore::InMem(sample_store.into_boxed_slice())
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples,
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let samples = {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples,
        })
    }

    /// Returns a placeholder tile for an area with no data on disk.
    ///
    /// Every sample of a tombstone is [`VOID`].
    pub fn tombstone(sw_corner: Coord<i16>, resolution: u8) -> Result<Self, NasademError> {
        let dimensions = dimensions_for(resolution)?;
        Ok(Self {
            sw_corner_center: Coord {
                x: C::from(sw_corner.x),
                y: C::from(sw_corner.y),
            },
            resolution,
            dimensions,
            samples: SampleStore::Tombstone,
        })
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (x, y) = self.dimensions;
        x * y
    }

    /// Rreturns this tile's resolution in arcseconds per sample.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns the center of this tile's south-west sample.
    pub fn sw_corner_center(&self) -> Coord<C> {
        self.sw_corner_center
    }

    /// Returns (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self.samples, SampleStore::Tombstone)
    }

    /// Returns the raw sample at the given geo coordinates, or `None`
    /// if `coord` falls outside this tile.
    pub fn get(&self, coord: Coord<C>) -> Option<i16> {
        let (idx_x, idx_y) = self.coord_to_xy(coord);
        #[allow(clippy::cast_possible_wrap)]
        if 0 <= idx_x
            && idx_x < self.dimensions.0 as isize
            && 0 <= idx_y
            && idx_y < self.dimensions.1 as isize
        {
            #[allow(clippy::cast_sign_loss)]
            Some(self.get_xy((idx_x as usize, idx_y as usize)))
        } else {
            None
        }
    }

    /// Returns the elevation at `coord`, or `None` when the coordinate
    /// is outside this tile or the sample is a void.
    pub fn elevation(&self, coord: Coord<C>) -> Option<i16> {
        self.get(coord).filter(|&sample| sample != VOID)
    }
}

/// Private API
impl Tile {
    fn get_xy(&self, (x, y): (usize, usize)) -> i16 {
        let idx_1d = self.xy_to_linear_index((x, y));
        self.samples.get_unchecked(idx_1d)
    }

    fn coord_to_xy(&self, coord: Coord<C>) -> (isize, isize) {
        let c = ARCSEC_PER_DEG / C::from(self.resolution);
        // Shift by half a sample so a coordinate snaps to the sample
        // whose cell contains it rather than the one to its SW.
        let cc = 1. / (c * 2.);
        #[allow(clippy::cast_possible_truncation)]
        let x = ((coord.x - self.sw_corner_center.x + cc) * c).floor() as isize;
        #[allow(clippy::cast_possible_truncation)]
        let y = ((coord.y - self.sw_corner_center.y + cc) * c).floor() as isize;
        (x, y)
    }

    #[cfg(test)]
    fn linear_index_to_xy(&self, idx: usize) -> (usize, usize) {
        let y = idx / self.dimensions.0;
        let x = idx % self.dimensions.0;
        (x, self.dimensions.1 - 1 - y)
    }

    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        self.dimensions.0 * (self.dimensions.1 - y - 1) + x
    }
}

fn dimensions_for(resolution: u8) -> Result<(usize, usize), NasademError> {
    match resolution {
        1 => Ok((3601, 3601)),
        3 => Ok((1201, 1201)),
        other => Err(NasademError::Resolution(other)),
    }
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, (usize, usize)), NasademError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(NasademError::HgtLen(
            invalid_len,
            path.as_ref().to_owned(),
        )),
    }
}

fn sw_corner_center<P: AsRef<Path>>(path: P) -> Result<Coord<C>, NasademError> {
    let Coord { x, y } = parse_sw_corner(&path)?;
    Ok(Coord {
        x: C::from(x),
        y: C::from(y),
    })
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, NasademError> {
    let mk_err = || NasademError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
