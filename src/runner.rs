//! Match runner.
//!
//! Drives one match from the initial map to a terminal state:
//! - Growth, arrivals and combat
//! - Engine invariant checks
//! - Polling every player with its own snapshot
//! - Order application in seat order
//! - Result and optional replay recording
//!
//! Given the same map, the same players and no timeouts, a match always
//! produces the same result.

mod result;
mod seat;

pub use result::{FaultRecord, MatchResult, Outcome, PlayerTally, Victory};

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::game::{
    check_conservation, check_invariants, GameState, GameView, InvariantViolation, Map, Order,
    PlayerId, TurnEvents,
};
use crate::player::Player;
use crate::replay::Replay;
use seat::Seat;

/// Default turn limit.
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Default per-turn time budget in milliseconds.
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 1000;

/// Configuration for a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Last turn that will be played.
    pub max_turns: u32,
    /// Per-turn budget for each player. `None` runs players inline with no
    /// time limit.
    pub turn_timeout_ms: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            turn_timeout_ms: Some(DEFAULT_TURN_TIMEOUT_MS),
        }
    }
}

impl MatchConfig {
    fn budget(&self) -> Option<Duration> {
        self.turn_timeout_ms.map(Duration::from_millis)
    }
}

/// Error type for match operations.
#[derive(Debug)]
pub enum MatchError {
    /// Not enough players (minimum 2).
    TooFewPlayers(usize),
    /// The map seats a different number of players.
    PlayerCountMismatch {
        /// Seats on the map.
        seats: usize,
        /// Players supplied.
        players: usize,
    },
    /// A player's worker thread could not be started.
    SeatThread {
        /// Seat that failed.
        player: PlayerId,
        /// Error details.
        error: std::io::Error,
    },
    /// The engine broke one of its own invariants. The match result cannot
    /// be trusted.
    EngineFault {
        /// Turn the violation was detected on.
        turn: u32,
        /// Everything that was wrong.
        violations: Vec<InvariantViolation>,
    },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPlayers(n) => write!(f, "Too few players: {n} (minimum 2)"),
            Self::PlayerCountMismatch { seats, players } => {
                write!(f, "Map seats {seats} players but {players} were given")
            }
            Self::SeatThread { player, error } => {
                write!(f, "Failed to start thread for player {player}: {error}")
            }
            Self::EngineFault { turn, violations } => {
                write!(f, "Engine fault on turn {turn}")?;
                for v in violations {
                    write!(f, "; {}", v.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// Run a complete match.
///
/// Players take seats in order: the first player is seat 1.
///
/// # Errors
///
/// Returns an error if the player count does not fit the map, a worker
/// thread cannot be started, or the engine detects an internal fault.
pub fn run_match(
    map: &Map,
    players: Vec<Box<dyn Player>>,
    config: &MatchConfig,
) -> Result<MatchResult, MatchError> {
    let mut runner = GameRunner::new(map, players, config)?;
    runner.run(None)
}

/// Run a complete match and record every turn for the viewer.
///
/// # Errors
///
/// Same as [`run_match`].
pub fn run_match_recorded(
    map: &Map,
    players: Vec<Box<dyn Player>>,
    config: &MatchConfig,
) -> Result<(MatchResult, Replay), MatchError> {
    let mut runner = GameRunner::new(map, players, config)?;
    let mut replay = Replay::new(map, runner.names(), &runner.state);
    let result = runner.run(Some(&mut replay))?;
    Ok((result, replay))
}

/// The runner that orchestrates one match.
struct GameRunner {
    /// Map name.
    map_name: String,
    /// Game state.
    state: GameState,
    /// Seats, in seat order.
    seats: Vec<Seat>,
    /// Configuration.
    config: MatchConfig,
    /// Rejected orders per seat.
    rejected: BTreeMap<PlayerId, u32>,
    /// Faults in the order they happened.
    faults: Vec<FaultRecord>,
    /// Seats that forfeited, if the match was aborted.
    forfeited: Vec<PlayerId>,
}

impl GameRunner {
    fn new(
        map: &Map,
        players: Vec<Box<dyn Player>>,
        config: &MatchConfig,
    ) -> Result<Self, MatchError> {
        let num_players = players.len();
        if num_players < 2 {
            return Err(MatchError::TooFewPlayers(num_players));
        }
        if num_players != map.player_count() {
            return Err(MatchError::PlayerCountMismatch {
                seats: map.player_count(),
                players: num_players,
            });
        }

        let state = GameState::new(map, config.max_turns);

        let mut seats = Vec::with_capacity(num_players);
        for (player, id) in players.into_iter().zip(state.seats()) {
            let seat = Seat::new(id, player, config.budget())
                .map_err(|error| MatchError::SeatThread { player: id, error })?;
            seats.push(seat);
        }

        Ok(Self {
            map_name: map.name().to_string(),
            state,
            seats,
            config: *config,
            rejected: BTreeMap::new(),
            faults: Vec::new(),
            forfeited: Vec::new(),
        })
    }

    /// Player names in seat order.
    fn names(&self) -> Vec<String> {
        self.seats.iter().map(|s| s.name().to_string()).collect()
    }

    /// Run the match to completion, recording every turn into `replay`.
    fn run(&mut self, mut replay: Option<&mut Replay>) -> Result<MatchResult, MatchError> {
        info!(
            map = %self.map_name,
            players = ?self.names(),
            max_turns = self.config.max_turns,
            "match started"
        );

        while !self.state.is_game_over() && self.forfeited.is_empty() {
            self.execute_turn()?;
            if let Some(replay) = replay.as_deref_mut()
                && self.forfeited.is_empty()
            {
                replay.record(&self.state);
            }
        }

        let result = self.build_result();
        info!(
            map = %result.map,
            outcome = ?result.outcome,
            turns = result.turns_played,
            "match finished"
        );
        Ok(result)
    }

    /// Execute a single turn for all players.
    fn execute_turn(&mut self) -> Result<(), MatchError> {
        let turn = self.state.turn();
        let before = self.state.total_ships();
        let start = self.state.clone();

        // Phase 1: growth, arrivals, combat
        let events = self.state.begin_turn();

        // Phase 2: every player thinks about the settled state
        let orders = self.poll_players(turn);
        if !self.forfeited.is_empty() {
            // The turn is not counted, so its phases are not kept either
            self.state = start;
            return Ok(());
        }

        // Phase 3: orders in seat order
        for (player, list) in &orders {
            let report = self.state.issue_orders(*player, list);
            if !report.rejected.is_empty() {
                let count = u32::try_from(report.rejected.len()).unwrap_or(u32::MAX);
                let total = self.rejected.entry(*player).or_default();
                *total = total.saturating_add(count);
            }
        }

        self.check_engine(turn, before, &events)?;

        // Phase 4: advance turn counter
        self.state.advance_turn();
        Ok(())
    }

    /// Ask every player for orders, recording faults.
    fn poll_players(&mut self, turn: u32) -> Vec<(PlayerId, Vec<Order>)> {
        for seat in &mut self.seats {
            let view = GameView::new(&self.state, seat.id());
            seat.dispatch(turn, view);
        }

        let mut orders = Vec::with_capacity(self.seats.len());
        for seat in &mut self.seats {
            let player = seat.id();
            match seat.collect() {
                Ok(list) => orders.push((player, list)),
                Err(fault) => {
                    if fault.is_forfeit() {
                        warn!(turn, player, name = seat.name(), %fault, "player forfeits");
                        self.forfeited.push(player);
                    } else {
                        warn!(turn, player, name = seat.name(), %fault, "player timed out");
                        orders.push((player, Vec::new()));
                    }
                    self.faults.push(FaultRecord {
                        player,
                        turn,
                        fault,
                    });
                }
            }
        }
        orders
    }

    /// Verify the engine's own bookkeeping after the order phase.
    fn check_engine(
        &self,
        turn: u32,
        before: u64,
        events: &TurnEvents,
    ) -> Result<(), MatchError> {
        let mut violations = check_invariants(&self.state);
        violations.extend(check_conservation(before, &self.state, events));
        if violations.is_empty() {
            return Ok(());
        }

        for v in &violations {
            error!(map = %self.map_name, turn, violation = %v.message, "engine invariant violated");
        }
        Err(MatchError::EngineFault { turn, violations })
    }

    /// Rank a seat for deciding the winner.
    fn standing(&self, player: PlayerId) -> (u64, u32) {
        (self.state.ships_of(player), self.state.planets_of(player))
    }

    /// Pick the unique best-ranked seat among `candidates`.
    fn best_of(&self, candidates: impl IntoIterator<Item = PlayerId>) -> Option<PlayerId> {
        let mut ranked: Vec<((u64, u32), PlayerId)> = candidates
            .into_iter()
            .map(|p| (self.standing(p), p))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        match ranked.as_slice() {
            [] => None,
            [(_, only)] => Some(*only),
            [(top, player), (second, _), ..] => (top != second).then_some(*player),
        }
    }

    /// Decide the outcome of the match.
    fn outcome(&self) -> Outcome {
        if !self.forfeited.is_empty() {
            let remaining = self
                .state
                .seats()
                .filter(|p| !self.forfeited.contains(p));
            return self.best_of(remaining).map_or(Outcome::Draw, |player| Outcome::Winner {
                player,
                victory: Victory::Forfeit,
            });
        }

        let present = self.state.present_players();
        if present.len() == 1
            && let Some(&player) = present.first()
        {
            return Outcome::Winner {
                player,
                victory: Victory::Elimination,
            };
        }

        let victory = if present.is_empty() {
            Victory::Elimination
        } else {
            Victory::TurnLimit
        };
        self.best_of(self.state.seats())
            .map_or(Outcome::Draw, |player| Outcome::Winner { player, victory })
    }

    /// Build the final match result.
    fn build_result(&self) -> MatchResult {
        let tallies = self
            .seats
            .iter()
            .map(|seat| {
                let player = seat.id();
                PlayerTally {
                    player,
                    name: seat.name().to_string(),
                    planets: self.state.planets_of(player),
                    ships: self.state.ships_of(player),
                    fleet_ships: self.state.fleet_ships_of(player),
                    growth: self.state.production_of(player),
                    rejected_orders: self.rejected.get(&player).copied().unwrap_or(0),
                }
            })
            .collect();

        MatchResult {
            map: self.map_name.clone(),
            players: self.names(),
            outcome: self.outcome(),
            turns_played: self.state.turns_played(),
            tallies,
            faults: self.faults.clone(),
        }
    }
}
