//! Incremental digitizing of multi-part ridge lines.

use crate::{tracer::Proposer, RidgeError};
use geo::geometry::{Coord, LineString, MultiLineString};
use log::debug;
use serde::{Deserialize, Serialize};

/// Default RDP tolerance, in query CRS units.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Segments are proposed by a [`Proposer`].
    #[default]
    Assisted,
    /// Presses are recorded verbatim.
    FreeDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No anchor.
    Idle,
    /// Anchor set, nothing proposed.
    Anchored,
    /// Anchor set and a proposal is pending.
    Proposing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Simplification {
    pub enabled: bool,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_SIMPLIFY_TOLERANCE
}

impl Default for Simplification {
    fn default() -> Self {
        Self {
            enabled: false,
            tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

/// Accumulates confirmed segments into a multi-part line.
///
/// Confirmed polylines only ever grow until [`RidgeSession::reset`] or
/// [`RidgeSession::deactivate`], and the dynamic path is only ever
/// replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidgeSession {
    anchor: Option<Coord>,
    dynamic: Option<LineString>,
    confirmed: Vec<LineString>,
    mode: Mode,
    free_draw: Vec<Coord>,
    simplification: Simplification,
}

impl RidgeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simplification(simplification: Simplification) -> Self {
        Self {
            simplification,
            ..Self::default()
        }
    }

    pub fn state(&self) -> State {
        match (self.anchor, &self.dynamic) {
            (None, _) => State::Idle,
            (Some(_), None) => State::Anchored,
            (Some(_), Some(_)) => State::Proposing,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn anchor(&self) -> Option<Coord> {
        self.anchor
    }

    pub fn dynamic_path(&self) -> Option<&LineString> {
        self.dynamic.as_ref()
    }

    pub fn confirmed_polylines(&self) -> &[LineString] {
        &self.confirmed
    }

    /// Returns the confirmed polylines as one multi-part line.
    pub fn confirmed_path(&self) -> MultiLineString {
        MultiLineString::new(self.confirmed.clone())
    }

    pub fn free_draw_buffer(&self) -> &[Coord] {
        &self.free_draw
    }

    pub fn simplification(&self) -> Simplification {
        self.simplification
    }

    /// Starts a line at `point`.
    pub fn set_anchor(&mut self, point: Coord) -> Result<(), RidgeError> {
        if self.state() != State::Idle {
            return Err(RidgeError::Transition("anchor is already set"));
        }
        self.anchor = Some(point);
        Ok(())
    }

    /// Replaces the dynamic path with `proposer`'s path from the anchor
    /// to `cursor`.
    ///
    /// Returns `Ok(None)` when there is nothing to propose: no anchor,
    /// free-draw mode, or a soft failure, which also clears the dynamic
    /// path. Hard failures leave the session untouched.
    pub fn propose<P>(&mut self, cursor: Coord, proposer: &P) -> Result<Option<&LineString>, RidgeError>
    where
        P: Proposer + ?Sized,
    {
        let Some(anchor) = self.anchor else {
            return Ok(None);
        };
        if self.mode == Mode::FreeDraw {
            return Ok(None);
        }
        let proposal = proposer.propose(anchor, cursor).and_then(|line| {
            let line = if self.simplification.enabled {
                proposer.simplify(&line, self.simplification.tolerance)?
            } else {
                line
            };
            if line.0.len() < 2 {
                Err(RidgeError::InvalidGeometry("proposal has fewer than two vertices"))
            } else {
                Ok(line)
            }
        });
        match proposal {
            Ok(line) => {
                self.dynamic = Some(line);
                Ok(self.dynamic.as_ref())
            }
            Err(e) if e.is_soft() => {
                debug!("no proposal to {cursor:?}: {e}");
                self.dynamic = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Moves the dynamic path to the confirmed polylines and anchors at
    /// its last point.
    ///
    /// Returns `false` when there was nothing to confirm.
    pub fn confirm(&mut self) -> bool {
        let Some(line) = self.dynamic.take() else {
            return false;
        };
        self.anchor = line.0.last().copied().or(self.anchor);
        self.confirmed.push(line);
        true
    }

    /// Handles a pointer press at `point`.
    pub fn press(&mut self, point: Coord) -> Result<(), RidgeError> {
        match (self.mode, self.state()) {
            (Mode::FreeDraw, _) => {
                self.free_draw.push(point);
                Ok(())
            }
            (Mode::Assisted, State::Idle) => self.set_anchor(point),
            (Mode::Assisted, _) => {
                self.confirm();
                Ok(())
            }
        }
    }

    /// Enters or leaves free-draw mode.
    ///
    /// Entering drops the dynamic path and starts the buffer at the
    /// anchor. Leaving turns two or more buffered points into a
    /// confirmed polyline; a lone point only becomes the anchor.
    pub fn set_free_draw(&mut self, enabled: bool) {
        match (self.mode, enabled) {
            (Mode::Assisted, true) => {
                self.mode = Mode::FreeDraw;
                self.dynamic = None;
                self.free_draw.clear();
                self.free_draw.extend(self.anchor);
            }
            (Mode::FreeDraw, false) => {
                self.mode = Mode::Assisted;
                let points = std::mem::take(&mut self.free_draw);
                if let Some(last) = points.last() {
                    self.anchor = Some(*last);
                }
                if points.len() >= 2 {
                    self.confirmed.push(LineString::new(points));
                }
            }
            _ => (),
        }
    }

    pub fn set_simplification(&mut self, enabled: bool, tolerance: f64) -> Result<(), RidgeError> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(RidgeError::Builder("simplification tolerance"));
        }
        self.simplification = Simplification { enabled, tolerance };
        Ok(())
    }

    /// Clears everything but the simplification settings.
    pub fn reset(&mut self) {
        *self = Self::with_simplification(self.simplification);
    }

    /// Flushes free-draw, then resets and returns the confirmed path.
    pub fn deactivate(&mut self) -> MultiLineString {
        self.set_free_draw(false);
        let path = MultiLineString::new(std::mem::take(&mut self.confirmed));
        self.reset();
        path
    }
}
