//! Match recordings for external viewers.
//!
//! A [`Replay`] holds the static planet layout and one [`TurnFrame`] per
//! turn, frame 0 being the initial state. It is written out as JSON or as
//! the classic Planet Wars playback string, and can be piped straight into
//! a viewer process. Recordings are export only; the engine never reads
//! them back.

mod playback;
mod viewer;

pub use viewer::launch_viewer;

use std::fs::File;
use std::io::{self, BufWriter, Write as IoWrite};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::{FleetId, GameState, Map, PlanetId, PlayerId};

/// Static description of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetLayout {
    /// Planet id.
    pub id: PlanetId,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Growth rate.
    pub growth_rate: u32,
    /// Owner at the start of the match.
    pub owner: PlayerId,
    /// Garrison at the start of the match.
    pub ships: u32,
}

/// A planet's changing fields in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetFrame {
    /// Owner.
    pub owner: PlayerId,
    /// Garrison.
    pub ships: u32,
}

/// A fleet in flight in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetFrame {
    /// Fleet id.
    pub id: FleetId,
    /// Owner.
    pub owner: PlayerId,
    /// Ships carried.
    pub ships: u32,
    /// Planet it left.
    pub source: PlanetId,
    /// Planet it is heading to.
    pub destination: PlanetId,
    /// Turns the whole trip takes.
    pub total_turns: u32,
    /// Turns left before arrival.
    pub turns_remaining: u32,
    /// Interpolated x coordinate.
    pub x: f64,
    /// Interpolated y coordinate.
    pub y: f64,
}

/// State of the board at the end of one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnFrame {
    /// Turns played when the frame was taken (0 = initial state).
    pub turn: u32,
    /// Planets, indexed by id.
    pub planets: Vec<PlanetFrame>,
    /// Fleets in flight, in launch order.
    pub fleets: Vec<FleetFrame>,
}

impl TurnFrame {
    /// Capture the current state.
    #[must_use]
    pub fn capture(state: &GameState) -> Self {
        let planets = state
            .planets()
            .iter()
            .map(|p| PlanetFrame {
                owner: p.owner,
                ships: p.ships,
            })
            .collect();
        let fleets = state
            .fleets()
            .iter()
            .filter_map(|f| {
                let position = f.position(state.planets())?;
                Some(FleetFrame {
                    id: f.id,
                    owner: f.owner,
                    ships: f.ships,
                    source: f.source,
                    destination: f.destination,
                    total_turns: f.total_turns,
                    turns_remaining: f.turns_remaining,
                    x: position.x,
                    y: position.y,
                })
            })
            .collect();

        Self {
            turn: state.turns_played(),
            planets,
            fleets,
        }
    }
}

/// Error type for replay export.
#[derive(Debug)]
pub enum ReplayError {
    /// Writing the recording failed.
    Io(io::Error),
    /// Serializing the recording failed.
    Json(serde_json::Error),
    /// The viewer could not be started or fed.
    Viewer {
        /// Program that was launched.
        program: String,
        /// Error details.
        error: io::Error,
    },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to write replay: {e}"),
            Self::Json(e) => write!(f, "Failed to serialize replay: {e}"),
            Self::Viewer { program, error } => write!(f, "Viewer '{program}' failed: {error}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::Viewer { error: e, .. } => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// A full match recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Map name.
    pub map: String,
    /// Player names in seat order.
    pub players: Vec<String>,
    /// Static planet layout.
    pub planets: Vec<PlanetLayout>,
    /// One frame per turn, frame 0 being the initial state.
    pub turns: Vec<TurnFrame>,
}

impl Replay {
    /// Start a recording from the initial state of a match.
    #[must_use]
    pub fn new(map: &Map, players: Vec<String>, initial: &GameState) -> Self {
        let planets = map
            .planets()
            .iter()
            .map(|p| PlanetLayout {
                id: p.id,
                x: p.position.x,
                y: p.position.y,
                growth_rate: p.growth_rate,
                owner: p.owner,
                ships: p.ships,
            })
            .collect();

        Self {
            map: map.name().to_string(),
            players,
            planets,
            turns: vec![TurnFrame::capture(initial)],
        }
    }

    /// Append a frame for the state after a turn.
    pub fn record(&mut self, state: &GameState) {
        self.turns.push(TurnFrame::capture(state));
    }

    /// Number of frames, including the initial one.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.turns.len()
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations fail.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Save in the viewer playback format.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations fail.
    pub fn save_playback(&self, path: &Path) -> Result<(), ReplayError> {
        let mut file = File::create(path)?;
        file.write_all(self.to_playback_string().as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Order;
    use tempfile::NamedTempFile;

    fn recorded() -> Replay {
        let map = Map::parse("duel", "P 0 0 1 20 2\nP 4 0 2 20 2\n").unwrap();
        let mut state = GameState::new(&map, 10);
        let mut replay = Replay::new(&map, vec!["a".into(), "b".into()], &state);
        state.step(&[(1, vec![Order::new(0, 1, 8)])]);
        replay.record(&state);
        replay
    }

    #[test]
    fn test_initial_frame() {
        let replay = recorded();
        assert_eq!(replay.frame_count(), 2);
        assert_eq!(replay.turns[0].turn, 0);
        assert!(replay.turns[0].fleets.is_empty());
        assert_eq!(replay.turns[0].planets[0], PlanetFrame { owner: 1, ships: 20 });
        assert!((replay.planets[1].x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fleet_frame_position() {
        let replay = recorded();
        let frame = &replay.turns[1];
        assert_eq!(frame.turn, 1);
        assert_eq!(frame.planets[0], PlanetFrame { owner: 1, ships: 14 });
        let fleet = frame.fleets[0];
        assert_eq!((fleet.total_turns, fleet.turns_remaining), (4, 4));
        // Just launched: still at the source
        assert!(fleet.x.abs() < 1e-12 && fleet.y.abs() < 1e-12);
    }

    #[test]
    fn test_save_json() {
        let replay = recorded();
        let file = NamedTempFile::new().unwrap();
        replay.save(file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let back: Replay = serde_json::from_str(&text).unwrap();
        assert_eq!(back, replay);
    }

    #[test]
    fn test_replay_error_display() {
        let err = ReplayError::from(io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
    }
}
