//! Scripted host events.
//!
//! ```json
//! [
//!   {"event": "press", "x": 850010.0, "y": 6539990.0},
//!   {"event": "move", "x": 850240.0, "y": 6539870.0},
//!   {"event": "press", "x": 850240.0, "y": 6539870.0},
//!   {"event": "simplify", "enabled": true, "tolerance": 5.0},
//!   {"event": "free_draw", "enabled": true},
//!   {"event": "reset"}
//! ]
//! ```

use geo::geometry::{Coord, MultiLineString};
use log::{debug, warn};
use ridge::{Mode, Proposer, RidgeError, RidgeSession, Simplification, State};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Pointer press.
    Press { x: f64, y: f64 },

    /// Pointer move.
    Move { x: f64, y: f64 },

    FreeDraw { enabled: bool },

    Simplify(Simplification),

    Reset,
}

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Event>> {
    let rdr = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(rdr)?)
}

/// Feeds `event` to `session`.
///
/// A move that yields no proposal is logged and skipped.
pub fn apply<P>(session: &mut RidgeSession, proposer: &P, event: &Event) -> Result<(), RidgeError>
where
    P: Proposer + ?Sized,
{
    debug!("{event:?}");
    match *event {
        Event::Press { x, y } => session.press(Coord { x, y })?,
        Event::Move { x, y } => {
            let assisted = session.mode() == Mode::Assisted && session.state() != State::Idle;
            if session.propose(Coord { x, y }, proposer)?.is_none() && assisted {
                warn!("no proposal from {:?} to ({x}, {y})", session.anchor());
            }
        }
        Event::FreeDraw { enabled } => session.set_free_draw(enabled),
        Event::Simplify(Simplification { enabled, tolerance }) => {
            session.set_simplification(enabled, tolerance)?;
        }
        Event::Reset => session.reset(),
    }
    Ok(())
}

/// Runs `events` through a fresh session and returns the path left
/// after deactivating it.
pub fn replay<P>(proposer: &P, events: &[Event]) -> Result<MultiLineString, RidgeError>
where
    P: Proposer + ?Sized,
{
    let mut session = RidgeSession::new();
    for event in events {
        apply(&mut session, proposer, event)?;
    }
    Ok(session.deactivate())
}

#[cfg(test)]
mod tests {
    use super::{replay, Event};
    use crate::test_dem;
    use geo::{coord, geometry::Coord};
    use ridge::{Identity, RidgeError, Simplification, Tracer, DEFAULT_SIMPLIFY_TOLERANCE};

    const SCRIPT: &str = r#"[
        {"event": "press", "x": 0.5, "y": 4.5},
        {"event": "move", "x": 0.7, "y": 4.3},
        {"event": "move", "x": 4.5, "y": 0.5},
        {"event": "press", "x": 4.5, "y": 0.5},
        {"event": "free_draw", "enabled": true},
        {"event": "press", "x": 4.5, "y": 2.5},
        {"event": "free_draw", "enabled": false},
        {"event": "simplify", "enabled": true}
    ]"#;

    #[test]
    fn test_parse() {
        let events: Vec<Event> = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(events.len(), 8);
        assert_eq!(events[0], Event::Press { x: 0.5, y: 4.5 });
        assert_eq!(
            events[7],
            Event::Simplify(Simplification {
                enabled: true,
                tolerance: DEFAULT_SIMPLIFY_TOLERANCE
            })
        );
        let explicit: Event =
            serde_json::from_str(r#"{"event": "simplify", "enabled": false, "tolerance": 7.5}"#)
                .unwrap();
        assert_eq!(
            explicit,
            Event::Simplify(Simplification {
                enabled: false,
                tolerance: 7.5
            })
        );
        let reset: Event = serde_json::from_str(r#"{"event": "reset"}"#).unwrap();
        assert_eq!(reset, Event::Reset);
    }

    #[test]
    fn test_replay() {
        let dem = test_dem();
        let tracer = Tracer::builder().build(&dem, Identity).unwrap();
        let events: Vec<Event> = serde_json::from_str(SCRIPT).unwrap();
        let path = replay(&tracer, &events).unwrap();
        assert_eq!(path.0.len(), 2);
        let diagonal: Vec<Coord> = (0..5)
            .map(|i| {
                let i = f64::from(i);
                coord!(x: 0.5 + i, y: 4.5 - i)
            })
            .collect();
        assert_eq!(path.0[0].0, diagonal);
        assert_eq!(
            path.0[1].0,
            vec![coord!(x: 4.5, y: 0.5), coord!(x: 4.5, y: 2.5)]
        );
    }

    #[test]
    fn test_hard_errors_abort() {
        let dem = test_dem();
        let tracer = Tracer::builder().build(&dem, Identity).unwrap();
        let events = [Event::Simplify(Simplification {
            enabled: true,
            tolerance: -2.0,
        })];
        assert!(matches!(
            replay(&tracer, &events),
            Err(RidgeError::Builder(_))
        ));
    }
}
