//! Map loading.
//!
//! A map is a text document with one planet per line:
//!
//! ```text
//! # x y owner ships growth
//! P 0 0 1 50 5
//! P 10 0 0 10 2
//! ```
//!
//! Owner `0` is neutral, `1` is player A, `2` is player B, and so on.
//! Blank lines and `#` comments are ignored. Maps carry no fleets.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::game::{Planet, PlayerId, Position, NEUTRAL};

/// What was wrong with a map document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapFormatErrorKind {
    /// The map file could not be read.
    Io(String),
    /// A line starts with something other than `P`.
    UnknownRecord(String),
    /// A fleet line appeared in a map.
    FleetInMap,
    /// A planet line has the wrong number of fields.
    FieldCount {
        /// Fields found after the record code.
        found: usize,
    },
    /// A field failed to parse.
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Raw text of the field.
        value: String,
    },
    /// The map has no planets.
    NoPlanets,
    /// No planet is owned by a player.
    NoPlayers,
    /// The map seats a different number of players than required.
    PlayerCount {
        /// Seats required by the caller.
        expected: usize,
        /// Seats present in the map.
        found: usize,
    },
    /// A seat between 1 and the highest owner has no starting planet.
    MissingSeat(PlayerId),
}

/// Error returned when a map cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFormatError {
    /// 1-based line number, if the error is tied to a line.
    pub line: Option<usize>,
    /// The problem.
    pub kind: MapFormatErrorKind,
}

impl MapFormatError {
    const fn at(line: usize, kind: MapFormatErrorKind) -> Self {
        Self {
            line: Some(line),
            kind,
        }
    }

    const fn whole(kind: MapFormatErrorKind) -> Self {
        Self { line: None, kind }
    }
}

impl fmt::Display for MapFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        match &self.kind {
            MapFormatErrorKind::Io(e) => write!(f, "cannot read map: {e}"),
            MapFormatErrorKind::UnknownRecord(code) => write!(f, "unknown record '{code}'"),
            MapFormatErrorKind::FleetInMap => write!(f, "maps cannot contain fleets"),
            MapFormatErrorKind::FieldCount { found } => {
                write!(f, "planet needs 5 fields (x y owner ships growth), found {found}")
            }
            MapFormatErrorKind::InvalidField { field, value } => {
                write!(f, "invalid {field}: '{value}'")
            }
            MapFormatErrorKind::NoPlanets => write!(f, "map has no planets"),
            MapFormatErrorKind::NoPlayers => write!(f, "no planet is owned by a player"),
            MapFormatErrorKind::PlayerCount { expected, found } => {
                write!(f, "map seats {found} players, {expected} required")
            }
            MapFormatErrorKind::MissingSeat(seat) => {
                write!(f, "player {seat} has no starting planet")
            }
        }
    }
}

impl std::error::Error for MapFormatError {}

/// A parsed map: the initial planet set of a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    /// Name used in results and logs.
    name: String,
    /// Planets, indexed by id.
    planets: Vec<Planet>,
    /// Highest owner id present.
    players: usize,
}

impl Map {
    /// Parse a map document.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is malformed, the map is empty, or the
    /// player seats are not numbered `1..=n` without gaps.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, MapFormatError> {
        let mut planets = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let code = fields.next().unwrap_or_default();
            match code {
                "P" => {}
                "F" => return Err(MapFormatError::at(line_no, MapFormatErrorKind::FleetInMap)),
                other => {
                    return Err(MapFormatError::at(
                        line_no,
                        MapFormatErrorKind::UnknownRecord(other.to_string()),
                    ));
                }
            }

            let values: Vec<&str> = fields.collect();
            let [x, y, owner, ships, growth] = values.as_slice() else {
                return Err(MapFormatError::at(
                    line_no,
                    MapFormatErrorKind::FieldCount {
                        found: values.len(),
                    },
                ));
            };

            let position = Position::new(
                parse_coordinate(line_no, "x", x)?,
                parse_coordinate(line_no, "y", y)?,
            );
            let owner: PlayerId = parse_field(line_no, "owner", owner)?;
            let ships: u32 = parse_field(line_no, "ships", ships)?;
            let growth_rate: u32 = parse_field(line_no, "growth", growth)?;

            planets.push(Planet::new(planets.len(), position, owner, ships, growth_rate));
        }

        if planets.is_empty() {
            return Err(MapFormatError::whole(MapFormatErrorKind::NoPlanets));
        }

        let players = usize::from(planets.iter().map(|p| p.owner).max().unwrap_or(NEUTRAL));
        if players == 0 {
            return Err(MapFormatError::whole(MapFormatErrorKind::NoPlayers));
        }
        for seat in 1..=players {
            if !planets.iter().any(|p| usize::from(p.owner) == seat) {
                #[allow(clippy::cast_possible_truncation)]
                let seat = seat as PlayerId;
                return Err(MapFormatError::whole(MapFormatErrorKind::MissingSeat(seat)));
            }
        }

        Ok(Self {
            name: name.into(),
            planets,
            players,
        })
    }

    /// Load a map from a file; the file stem becomes the map name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, MapFormatError> {
        let text = fs::read_to_string(path)
            .map_err(|e| MapFormatError::whole(MapFormatErrorKind::Io(e.to_string())))?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().to_string());
        Self::parse(name, &text)
    }

    /// Check that the map seats exactly `players` players.
    ///
    /// # Errors
    ///
    /// Returns [`MapFormatErrorKind::PlayerCount`] on mismatch.
    pub fn require_players(&self, players: usize) -> Result<(), MapFormatError> {
        if self.players == players {
            Ok(())
        } else {
            Err(MapFormatError::whole(MapFormatErrorKind::PlayerCount {
                expected: players,
                found: self.players,
            }))
        }
    }

    /// Map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Initial planets, indexed by id.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Number of player seats.
    #[must_use]
    pub const fn player_count(&self) -> usize {
        self.players
    }

    /// Serialize back to the map text format.
    #[must_use]
    pub fn to_map_string(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        for p in &self.planets {
            let _ = writeln!(
                out,
                "P {} {} {} {} {}",
                p.position.x, p.position.y, p.owner, p.ships, p.growth_rate
            );
        }
        out
    }
}

fn parse_field<T: std::str::FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, MapFormatError> {
    value.parse().map_err(|_| {
        MapFormatError::at(
            line,
            MapFormatErrorKind::InvalidField {
                field,
                value: value.to_string(),
            },
        )
    })
}

fn parse_coordinate(line: usize, field: &'static str, value: &str) -> Result<f64, MapFormatError> {
    let v: f64 = parse_field(line, field, value)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MapFormatError::at(
            line,
            MapFormatErrorKind::InvalidField {
                field,
                value: value.to_string(),
            },
        ))
    }
}
