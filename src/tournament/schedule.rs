//! Fixture scheduling.
//!
//! A fixture is one match: a map and an ordered pair of entrants (the first
//! takes seat 1). Fixtures are numbered in a fixed order (pairing, then
//! map, then seat order) so results can always be sorted back into the
//! same sequence.

use serde::{Deserialize, Serialize};

use crate::tournament::TournamentError;

/// Which entrants meet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PairingMode {
    /// One entrant plays every other entrant.
    Focal {
        /// Name of the focal entrant.
        player: String,
    },
    /// Every unordered pair of entrants plays.
    #[default]
    AllAgainstAll,
}

/// One scheduled match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Position in the schedule.
    pub index: usize,
    /// Index of the map.
    pub map: usize,
    /// Entrant indices for seat 1 and seat 2.
    pub seats: [usize; 2],
}

/// Unordered pairs of entrant indices for a pairing mode.
///
/// # Errors
///
/// Returns [`TournamentError::UnknownPlayer`] if the focal entrant is not
/// registered.
pub fn pairings(names: &[&str], mode: &PairingMode) -> Result<Vec<(usize, usize)>, TournamentError> {
    match mode {
        PairingMode::Focal { player } => {
            let focal = names
                .iter()
                .position(|n| n == player)
                .ok_or_else(|| TournamentError::UnknownPlayer(player.clone()))?;
            Ok((0..names.len())
                .filter(|&other| other != focal)
                .map(|other| (focal, other))
                .collect())
        }
        PairingMode::AllAgainstAll => Ok((0..names.len())
            .flat_map(|a| (a + 1..names.len()).map(move |b| (a, b)))
            .collect()),
    }
}

/// Expand pairings into numbered fixtures.
///
/// With `swap_seats` every pairing is played from both seats on every map.
#[must_use]
pub fn fixtures(pairs: &[(usize, usize)], map_count: usize, swap_seats: bool) -> Vec<Fixture> {
    let mut out = Vec::new();
    for &(a, b) in pairs {
        for map in 0..map_count {
            out.push(Fixture {
                index: out.len(),
                map,
                seats: [a, b],
            });
            if swap_seats {
                out.push(Fixture {
                    index: out.len(),
                    map,
                    seats: [b, a],
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["a", "b", "c", "d"];

    #[test]
    fn test_all_against_all_pairings() {
        let pairs = pairings(NAMES, &PairingMode::AllAgainstAll).unwrap();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_focal_pairings() {
        let mode = PairingMode::Focal {
            player: "c".to_string(),
        };
        let pairs = pairings(NAMES, &mode).unwrap();
        assert_eq!(pairs, vec![(2, 0), (2, 1), (2, 3)]);
    }

    #[test]
    fn test_unknown_focal() {
        let mode = PairingMode::Focal {
            player: "zed".to_string(),
        };
        assert!(matches!(
            pairings(NAMES, &mode),
            Err(TournamentError::UnknownPlayer(name)) if name == "zed"
        ));
    }

    #[test]
    fn test_fixture_numbering() {
        let list = fixtures(&[(0, 1), (0, 2)], 2, true);
        assert_eq!(list.len(), 8);
        for (i, f) in list.iter().enumerate() {
            assert_eq!(f.index, i);
        }
        assert_eq!(list[0].seats, [0, 1]);
        assert_eq!(list[1].seats, [1, 0]);
        assert_eq!(list[2].map, 1);
        assert_eq!(list[7].seats, [2, 0]);
    }

    #[test]
    fn test_fixtures_without_swap() {
        let list = fixtures(&[(0, 1)], 3, false);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|f| f.seats == [0, 1]));
    }

    #[test]
    fn test_pairing_mode_json() {
        let mode: PairingMode =
            serde_json::from_str(r#"{"mode":"focal","player":"expander"}"#).unwrap();
        assert_eq!(
            mode,
            PairingMode::Focal {
                player: "expander".to_string()
            }
        );
    }
}
