//! Aggregation of match records into tallies and standings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::runner::MatchResult;
use crate::tournament::MatchRecord;

/// Points awarded per match outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Points for a win.
    pub win: f64,
    /// Points for a draw.
    pub draw: f64,
    /// Points for a loss.
    pub loss: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            win: 1.0,
            draw: 0.5,
            loss: 0.0,
        }
    }
}

/// Win/loss/draw counts for some slice of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Matches played.
    pub played: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Matches lost by this player's own forfeit.
    pub forfeits: u32,
}

impl Tally {
    /// Count one match from the point of view of seat index `seat` (0-based).
    pub(crate) fn add(&mut self, result: &MatchResult, seat: usize) {
        let Ok(player) = u8::try_from(seat + 1) else {
            return;
        };
        self.played += 1;
        match result.winner() {
            None => self.draws += 1,
            Some(winner) if winner == player => self.wins += 1,
            Some(_) => self.losses += 1,
        }
        if result.forfeited(player) {
            self.forfeits += 1;
        }
    }

    /// Points under `weights`.
    #[must_use]
    pub fn points(&self, weights: &ScoringWeights) -> f64 {
        f64::from(self.wins) * weights.win
            + f64::from(self.draws) * weights.draw
            + f64::from(self.losses) * weights.loss
    }

    /// Fraction of matches won.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.played)
        }
    }
}

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Entrant name.
    pub player: String,
    /// Counts over every match the entrant played.
    #[serde(flatten)]
    pub tally: Tally,
    /// Points under the tournament's weights.
    pub points: f64,
}

/// Tallies keyed by `(player, map, opponent)`.
pub type ResultTable = BTreeMap<(String, String, String), Tally>;

/// Build the `(player, map, opponent)` table.
pub(crate) fn table(records: &[MatchRecord]) -> ResultTable {
    let mut table = ResultTable::new();
    for record in records {
        let result = &record.result;
        for (seat, player) in result.players.iter().enumerate() {
            for (other, opponent) in result.players.iter().enumerate() {
                if other == seat {
                    continue;
                }
                table
                    .entry((player.clone(), result.map.clone(), opponent.clone()))
                    .or_default()
                    .add(result, seat);
            }
        }
    }
    table
}

/// Per-entrant totals, best first (points, then wins, then name).
pub(crate) fn standings(records: &[MatchRecord], weights: &ScoringWeights) -> Vec<Standing> {
    let mut totals: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        for (seat, player) in record.result.players.iter().enumerate() {
            totals.entry(player.as_str()).or_default().add(&record.result, seat);
        }
    }

    let mut out: Vec<Standing> = totals
        .into_iter()
        .map(|(player, tally)| Standing {
            player: player.to_string(),
            points: tally.points(weights),
            tally,
        })
        .collect();
    out.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then(b.tally.wins.cmp(&a.tally.wins))
            .then(a.player.cmp(&b.player))
    });
    out
}
