//! Final result of a match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlayerFault;
use crate::game::PlayerId;

/// How a winner was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Victory {
    /// Every other player was eliminated.
    Elimination,
    /// Best placed when the turn limit was reached.
    TurnLimit,
    /// Another player's turn failed.
    Forfeit,
}

impl fmt::Display for Victory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elimination => write!(f, "elimination"),
            Self::TurnLimit => write!(f, "turn_limit"),
            Self::Forfeit => write!(f, "forfeit"),
        }
    }
}

/// Outcome of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// One player won.
    Winner {
        /// Winning seat.
        player: PlayerId,
        /// How the win came about.
        victory: Victory,
    },
    /// Nobody won.
    Draw,
}

/// Final standing of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    /// Seat number.
    pub player: PlayerId,
    /// Player name.
    pub name: String,
    /// Planets owned at the end.
    pub planets: u32,
    /// Ships on planets and in flight at the end.
    pub ships: u64,
    /// Of which in flight.
    pub fleet_ships: u64,
    /// Combined growth rate of owned planets at the end.
    pub growth: u64,
    /// Orders dropped by validation over the whole match.
    pub rejected_orders: u32,
}

/// A player-attributable fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    /// Seat at fault.
    pub player: PlayerId,
    /// Turn it happened on.
    pub turn: u32,
    /// What went wrong.
    pub fault: PlayerFault,
}

/// Everything a finished match reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Map name.
    pub map: String,
    /// Player names in seat order.
    pub players: Vec<String>,
    /// Winner or draw.
    pub outcome: Outcome,
    /// Turns fully played.
    pub turns_played: u32,
    /// Final standing per seat, in seat order.
    pub tallies: Vec<PlayerTally>,
    /// Faults in the order they happened.
    pub faults: Vec<FaultRecord>,
}

impl MatchResult {
    /// Winning seat, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            Outcome::Winner { player, .. } => Some(player),
            Outcome::Draw => None,
        }
    }

    /// Name of the winner, if any.
    #[must_use]
    pub fn winner_name(&self) -> Option<&str> {
        let seat = usize::from(self.winner()?);
        self.players.get(seat.checked_sub(1)?).map(String::as_str)
    }

    /// Name seated at `player`.
    #[must_use]
    pub fn player_name(&self, player: PlayerId) -> Option<&str> {
        let idx = usize::from(player).checked_sub(1)?;
        self.players.get(idx).map(String::as_str)
    }

    /// Final tally of a seat.
    #[must_use]
    pub fn tally(&self, player: PlayerId) -> Option<&PlayerTally> {
        self.tallies.iter().find(|t| t.player == player)
    }

    /// Faults attributed to a seat.
    pub fn faults_of(&self, player: PlayerId) -> impl Iterator<Item = &FaultRecord> {
        self.faults.iter().filter(move |f| f.player == player)
    }

    /// Whether a seat forfeited.
    #[must_use]
    pub fn forfeited(&self, player: PlayerId) -> bool {
        self.faults_of(player).any(|f| f.fault.is_forfeit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        MatchResult {
            map: "duel".to_string(),
            players: vec!["alpha".to_string(), "beta".to_string()],
            outcome: Outcome::Winner {
                player: 2,
                victory: Victory::Forfeit,
            },
            turns_played: 7,
            tallies: vec![],
            faults: vec![
                FaultRecord {
                    player: 2,
                    turn: 3,
                    fault: PlayerFault::Timeout { budget_ms: 10 },
                },
                FaultRecord {
                    player: 1,
                    turn: 8,
                    fault: PlayerFault::Raised {
                        message: "boom".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_winner_lookup() {
        let result = sample();
        assert_eq!(result.winner(), Some(2));
        assert_eq!(result.winner_name(), Some("beta"));
        assert_eq!(result.player_name(1), Some("alpha"));
        assert_eq!(result.player_name(0), None);
    }

    #[test]
    fn test_forfeit_detection() {
        let result = sample();
        assert!(result.forfeited(1));
        assert!(!result.forfeited(2));
        assert_eq!(result.faults_of(2).count(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let result = sample();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""result":"winner""#));
        assert!(json.contains(r#""victory":"forfeit""#));
        let back: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
