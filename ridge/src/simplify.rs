//! Line simplification which never drops the highest vertex.

use crate::RidgeError;
use geo::{
    geometry::{Coord, Line, LineString},
    Intersects, SimplifyIdx,
};
use log::debug;

/// Simplifies `line` with Ramer–Douglas–Peucker at `tolerance` while
/// keeping its apex, the first vertex of greatest `elevation`.
///
/// Vertices without an elevation never become the apex. When plain
/// RDP drops the apex, it is put back in order and each side of it is
/// simplified again on its own. A result that crosses itself is
/// discarded in favor of `line` unchanged.
pub fn simplify_preserving_apex<F>(
    line: &LineString,
    tolerance: f64,
    mut elevation: F,
) -> Result<LineString, RidgeError>
where
    F: FnMut(Coord) -> Result<Option<f64>, RidgeError>,
{
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(RidgeError::InvalidGeometry("simplify tolerance"));
    }
    if line.0.len() < 3 {
        return Ok(line.clone());
    }

    let mut apex: Option<(usize, f64)> = None;
    for (idx, coord) in line.0.iter().enumerate() {
        if let Some(elev) = elevation(*coord)? {
            if apex.map_or(true, |(_, max)| elev > max) {
                apex = Some((idx, elev));
            }
        }
    }

    let mut kept = line.simplify_idx(&tolerance);
    if let Some((apex_idx, elev)) = apex {
        if let Err(pos) = kept.binary_search(&apex_idx) {
            debug!("simplify; reinserting apex {apex_idx} at {elev}");
            kept.insert(pos, apex_idx);
            let head = resimplify(line, &kept[..=pos], tolerance);
            let tail = resimplify(line, &kept[pos..], tolerance);
            kept = head.into_iter().chain(tail.into_iter().skip(1)).collect();
        }
    }

    let simplified: LineString = kept.into_iter().map(|idx| line.0[idx]).collect();
    if crosses_itself(&simplified) {
        debug!("simplify; result crosses itself, keeping {} vertices", line.0.len());
        return Ok(line.clone());
    }
    Ok(simplified)
}

/// Returns `true` if two non-consecutive segments of `line` touch, or
/// if a segment doubles back over the previous one.
fn crosses_itself(line: &LineString) -> bool {
    let segments: Vec<Line> = line.lines().collect();
    segments.iter().enumerate().any(|(i, a)| {
        segments.get(i + 1).is_some_and(|b| doubles_back(a, b))
            || segments.iter().skip(i + 2).any(|b| a.intersects(b))
    })
}

fn doubles_back(a: &Line, b: &Line) -> bool {
    let (u, v) = (a.delta(), b.delta());
    u.x * v.y - u.y * v.x == 0.0 && u.x * v.x + u.y * v.y < 0.0
}

/// Simplifies the sub-line made of `indices` of `line`, returning
/// indices into `line`.
fn resimplify(line: &LineString, indices: &[usize], tolerance: f64) -> Vec<usize> {
    let part: LineString = indices.iter().map(|&idx| line.0[idx]).collect();
    part.simplify_idx(&tolerance)
        .into_iter()
        .map(|idx| indices[idx])
        .collect()
}
