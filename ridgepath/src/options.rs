use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand};
use geo::geometry::Coord;
use ridge::{DEFAULT_CAP_SEGMENTS, DEFAULT_CORRIDOR_RADIUS};
use std::{path::PathBuf, str::FromStr};

/// Trace ridge and valley lines over a digital elevation model.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// ESRI ASCII grid (`.asc`) elevation model.
    #[arg(long, conflicts_with = "tile_dir", required_unless_present = "tile_dir")]
    pub dem: Option<PathBuf>,

    /// CRS of the `--dem` grid, also used for all coordinates.
    #[arg(long, default_value = "EPSG:2154")]
    pub crs: String,

    /// Directory of NASADEM tiles. Coordinates are then "lon,lat".
    #[arg(short, long)]
    pub tile_dir: Option<PathBuf>,

    /// Resolution of the tiles in `--tile-dir`.
    #[arg(long, default_value_t = 3)]
    pub arcseconds: u8,

    /// Corridor radius around each segment, in CRS units, or in metres
    /// over EPSG:4326 data such as `--tile-dir`.
    #[arg(short, long, default_value_t = DEFAULT_CORRIDOR_RADIUS)]
    pub buffer: f64,

    /// Chords per round corridor end.
    #[arg(long, default_value_t = DEFAULT_CAP_SEGMENTS)]
    pub cap_segments: usize,

    /// Follow valley bottoms instead of ridges.
    #[arg(long, default_value_t = false)]
    pub valley: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

/// An "x,y" coordinate pair.
#[derive(Clone, Debug, Copy)]
pub struct XY(pub Coord<f64>);

impl FromStr for XY {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (x_str, y_str) = s.split_once(',').ok_or_else(|| anyhow!("not a valid x,y"))?;
        let x = f64::from_str(x_str.trim())?;
        let y = f64::from_str(y_str.trim())?;
        Ok(Self(Coord { x, y }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Trace a single segment.
    Trace {
        /// Start "x,y".
        #[arg(long, allow_hyphen_values = true)]
        start: XY,

        /// End "x,y".
        #[arg(long, allow_hyphen_values = true)]
        end: XY,

        /// Simplify the path with this tolerance.
        #[arg(short, long)]
        simplify: Option<f64>,

        #[command(subcommand)]
        output: Output,
    },

    /// Replay a JSON script of session events and print the resulting
    /// path as GeoJSON.
    Replay {
        /// Script file.
        script: PathBuf,
    },
}

#[derive(Debug, Subcommand, Clone, Copy)]
pub enum Output {
    /// Print path and elevations to stdout.
    Json,

    /// Print elevation profile to stdout.
    Csv,

    /// Plot elevation profile to terminal.
    Plot,

    /// Print path as a GeoJSON feature.
    Geojson,
}
