mod events;
mod export;
mod options;

use anyhow::{bail, Error as AnyError};
use clap::Parser;
use options::{Cli, Command as CliCmd, Output};
use ridge::{
    asc, geo::geometry::Coord, CostModel, Crs, ElevationProfile, ElevationSource, Identity,
    TileMode, TileSet, Tracer, METRES_PER_DEGREE,
};
use serde::Serialize;
use std::io::Write;
use textplots::{Chart, Plot, Shape};

type Source = Box<dyn ElevationSource>;

fn main() -> Result<(), AnyError> {
    let Cli {
        dem,
        crs,
        tile_dir,
        arcseconds,
        buffer,
        cap_segments,
        valley,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let source: Source = match (dem, tile_dir) {
        (Some(dem), _) => Box::new(asc::load(dem, Crs::new(crs))?),
        (None, Some(tile_dir)) => Box::new(TileSet::new(tile_dir, TileMode::MemMap, arcseconds)?),
        (None, None) => bail!("one of --dem or --tile-dir is required"),
    };
    let cost = if valley {
        CostModel::Valley
    } else {
        CostModel::Ridge
    };
    let radius = corridor_radius(buffer, source.crs());
    let tracer = Tracer::builder()
        .radius(radius)
        .cap_segments(cap_segments)
        .cost(cost)
        .build(source, Identity)?;

    match cmd {
        CliCmd::Trace {
            start,
            end,
            simplify,
            output,
        } => trace(&tracer, start.0, end.0, simplify, output),
        CliCmd::Replay { script } => {
            let events = events::load(script)?;
            let path = events::replay(&tracer, &events)?;
            println!("{}", serde_json::to_string(&export::feature_collection(&path))?);
            Ok(())
        }
    }
}

/// Converts `--buffer` to query CRS units. Over geographic tiles the
/// buffer is given in metres.
fn corridor_radius(buffer: f64, crs: &Crs) -> f64 {
    if *crs == Crs::wgs84() {
        buffer / METRES_PER_DEGREE
    } else {
        buffer
    }
}

fn trace(
    tracer: &Tracer<Source>,
    start: Coord,
    end: Coord,
    simplify: Option<f64>,
    output: Output,
) -> Result<(), AnyError> {
    let mut line = tracer.trace(start, end)?.line;
    if let Some(tolerance) = simplify {
        line = tracer.simplify(&line, tolerance)?;
    }
    match output {
        Output::Json => print_json(&tracer.profile(&line)?),
        Output::Csv => print_csv(&tracer.profile(&line)?),
        Output::Plot => {
            plot_ascii(&tracer.profile(&line)?);
            Ok(())
        }
        Output::Geojson => {
            println!("{}", serde_json::to_string(&export::line_feature(&line))?);
            Ok(())
        }
    }
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run -- --dem=dem.asc trace --start=850010,6539990 --end=850240,6539870 csv | tr ',' ' ' > ~/.tmp/plot && gnuplot -p -e "plot '~/.tmp/plot' using 1:4 with lines"
/// ```
fn print_csv(profile: &ElevationProfile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,X,Y,Elevation")?;
    for (point, (distance, elevation)) in profile.points.iter().zip(profile.pairs()) {
        let elevation = elevation.map(|e| e.to_string()).unwrap_or_default();
        writeln!(stdout, "{distance},{},{},{elevation}", point.x, point.y)?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn plot_ascii(profile: &ElevationProfile) {
    let plot_data: Vec<(f32, f32)> = profile
        .pairs()
        .filter_map(|(distance, elev)| elev.map(|e| (distance as f32, e as f32)))
        .collect();
    Chart::new(300, 150, 0.0, profile.total_distance() as f32)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}

fn print_json(profile: &ElevationProfile) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        location: [f64; 2],
        distance: f64,
        elevation: Option<f64>,
    }

    let reshaped: Vec<JsonEntry> = profile
        .points
        .iter()
        .zip(profile.pairs())
        .map(|(point, (distance, elevation))| JsonEntry {
            location: [point.x, point.y],
            distance,
            elevation,
        })
        .collect();
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

/// 5x5 pyramid peaking at 100 on the center cell.
#[cfg(test)]
fn test_dem() -> ridge::MemRaster {
    const DEM: &str = "\
ncols 5
nrows 5
xllcorner 0
yllcorner 0
cellsize 1
80 80 80 80 80
80 90 90 90 80
80 90 100 90 80
80 90 90 90 80
80 80 80 80 80
";
    asc::parse(DEM.as_bytes(), Crs::epsg(2154)).unwrap()
}
