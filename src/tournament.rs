//! Tournament runner for Planet Wars matches.
//!
//! The tournament runner handles:
//! - Map registration (bad maps are skipped and reported)
//! - Deterministic fixture scheduling
//! - Parallel match execution on a dedicated rayon pool
//! - A single collector that owns the results table
//! - Cancellation between matches
//!
//! Every match gets fresh player instances from each entrant's factory, so
//! no bot memory leaks from one match into another.

mod export;
mod schedule;
mod scoring;

pub use export::CSV_HEADER;
pub use schedule::{fixtures, pairings, Fixture, PairingMode};
pub use scoring::{ResultTable, ScoringWeights, Standing, Tally};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::game::{Map, MapFormatError};
use crate::player::Player;
use crate::runner::{run_match, MatchConfig, MatchError, MatchResult};

/// Number of seats in every tournament match.
pub const SEATS: usize = 2;

/// Builds a fresh player for each match.
pub type PlayerFactory = Arc<dyn Fn() -> Box<dyn Player> + Send + Sync>;

/// A registered tournament participant.
#[derive(Clone)]
pub struct Entrant {
    /// Unique name used in results.
    name: String,
    /// Player constructor.
    factory: PlayerFactory,
}

impl std::fmt::Debug for Entrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entrant")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Entrant {
    /// Create an entrant from a name and a player constructor.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Player> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Entrant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh player.
    #[must_use]
    pub fn create(&self) -> Box<dyn Player> {
        (self.factory)()
    }
}

/// Shared flag that stops a tournament between matches.
///
/// Matches already running finish and are kept; fixtures not yet started
/// are counted as unplayed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for the tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Settings for every match.
    pub game: MatchConfig,
    /// Who plays whom.
    pub pairing: PairingMode,
    /// Play every pairing from both seats.
    pub swap_seats: bool,
    /// Worker threads for matches (`None` = one per CPU).
    pub threads: Option<usize>,
    /// Points per outcome in the standings.
    pub scoring: ScoringWeights,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            game: MatchConfig::default(),
            pairing: PairingMode::AllAgainstAll,
            swap_seats: true,
            threads: None,
            scoring: ScoringWeights::default(),
        }
    }
}

impl TournamentConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TournamentError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TournamentError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| TournamentError::Config(format!("{}: {e}", path.display())))
    }
}

/// Error type for tournament operations.
#[derive(Debug)]
pub enum TournamentError {
    /// Not enough entrants (minimum 2).
    TooFewPlayers(usize),
    /// Two entrants share a name.
    DuplicatePlayer(String),
    /// The focal entrant is not registered.
    UnknownPlayer(String),
    /// No playable map was registered.
    NoMaps,
    /// The configuration file could not be loaded.
    Config(String),
    /// The match thread pool could not be built.
    ThreadPool(String),
    /// A match failed for a reason other than a player fault.
    Match {
        /// Fixture that failed.
        fixture: usize,
        /// Error details.
        error: MatchError,
    },
    /// The engine broke one of its invariants; the tournament was stopped.
    EngineFault {
        /// Fixture that failed.
        fixture: usize,
        /// Error details.
        error: MatchError,
    },
    /// Writing results failed.
    Export(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPlayers(n) => write!(f, "Too few players: {n} (minimum 2)"),
            Self::DuplicatePlayer(name) => write!(f, "Player '{name}' registered twice"),
            Self::UnknownPlayer(name) => write!(f, "Unknown player '{name}'"),
            Self::NoMaps => write!(f, "No playable maps"),
            Self::Config(e) => write!(f, "Invalid tournament config: {e}"),
            Self::ThreadPool(e) => write!(f, "Failed to start match threads: {e}"),
            Self::Match { fixture, error } => write!(f, "Fixture {fixture} failed: {error}"),
            Self::EngineFault { fixture, error } => {
                write!(f, "Tournament stopped at fixture {fixture}: {error}")
            }
            Self::Export(e) => write!(f, "Failed to export results: {e}"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// A map that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMap {
    /// Map name or path.
    pub map: String,
    /// Why it was skipped.
    pub error: MapFormatError,
}

/// One played match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Position in the schedule.
    pub fixture: usize,
    /// What happened.
    #[serde(flatten)]
    pub result: MatchResult,
}

/// Everything a tournament produced.
#[derive(Debug, Clone)]
pub struct TournamentResults {
    /// Played matches, in fixture order.
    pub records: Vec<MatchRecord>,
    /// Maps that were left out.
    pub skipped_maps: Vec<SkippedMap>,
    /// Fixtures not played because of cancellation.
    pub unplayed: usize,
    /// Whether the tournament was cut short.
    pub cancelled: bool,
    /// Weights used for the standings.
    pub scoring: ScoringWeights,
}

impl TournamentResults {
    /// Tallies keyed by `(player, map, opponent)`.
    #[must_use]
    pub fn table(&self) -> ResultTable {
        scoring::table(&self.records)
    }

    /// Counts for `player` against `opponent` on `map`.
    #[must_use]
    pub fn tally(&self, player: &str, map: &str, opponent: &str) -> Tally {
        let mut tally = Tally::default();
        for record in &self.records {
            let result = &record.result;
            if result.map != map {
                continue;
            }
            let seat = result.players.iter().position(|p| p == player);
            let faced = result.players.iter().any(|p| p == opponent);
            if let Some(seat) = seat
                && faced
                && player != opponent
            {
                tally.add(result, seat);
            }
        }
        tally
    }

    /// Per-entrant totals, best first.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        scoring::standings(&self.records, &self.scoring)
    }
}

/// A set of entrants and maps to play.
#[derive(Debug, Default)]
pub struct Tournament {
    /// Registered entrants.
    entrants: Vec<Entrant>,
    /// Playable maps.
    maps: Vec<Map>,
    /// Maps rejected at registration.
    skipped: Vec<SkippedMap>,
    /// Configuration.
    config: TournamentConfig,
}

/// What a match worker sends to the collector.
enum Message {
    Played(usize, Box<Result<MatchResult, MatchError>>),
    Unplayed,
}

impl Tournament {
    /// Create an empty tournament.
    #[must_use]
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Register an entrant.
    ///
    /// # Errors
    ///
    /// Returns an error if an entrant with the same name exists.
    pub fn add_player(&mut self, entrant: Entrant) -> Result<(), TournamentError> {
        if self.entrants.iter().any(|e| e.name == entrant.name) {
            return Err(TournamentError::DuplicatePlayer(entrant.name));
        }
        self.entrants.push(entrant);
        Ok(())
    }

    /// Register a parsed map.
    ///
    /// A map that does not seat exactly two players is skipped and
    /// reported in the results.
    ///
    /// # Errors
    ///
    /// Returns the reason the map was skipped.
    pub fn add_map(&mut self, map: Map) -> Result<(), MapFormatError> {
        if let Err(e) = map.require_players(SEATS) {
            self.skip(map.name().to_string(), e.clone());
            return Err(e);
        }
        self.maps.push(map);
        Ok(())
    }

    /// Parse and register a map from text.
    ///
    /// # Errors
    ///
    /// Returns the reason the map was skipped.
    pub fn add_map_text(&mut self, name: &str, text: &str) -> Result<(), MapFormatError> {
        match Map::parse(name, text) {
            Ok(map) => self.add_map(map),
            Err(e) => {
                self.skip(name.to_string(), e.clone());
                Err(e)
            }
        }
    }

    /// Load and register a map file.
    ///
    /// # Errors
    ///
    /// Returns the reason the map was skipped.
    pub fn add_map_file(&mut self, path: &Path) -> Result<(), MapFormatError> {
        match Map::load(path) {
            Ok(map) => self.add_map(map),
            Err(e) => {
                self.skip(path.display().to_string(), e.clone());
                Err(e)
            }
        }
    }

    fn skip(&mut self, map: String, error: MapFormatError) {
        warn!(map = %map, %error, "skipping map");
        self.skipped.push(SkippedMap { map, error });
    }

    /// Registered entrant names, in registration order.
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.entrants.iter().map(Entrant::name)
    }

    /// Playable maps, in registration order.
    #[must_use]
    pub fn maps(&self) -> &[Map] {
        &self.maps
    }

    /// The full schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two entrants, no playable
    /// maps, or the focal entrant is unknown.
    pub fn fixtures(&self) -> Result<Vec<Fixture>, TournamentError> {
        if self.entrants.len() < SEATS {
            return Err(TournamentError::TooFewPlayers(self.entrants.len()));
        }
        if self.maps.is_empty() {
            return Err(TournamentError::NoMaps);
        }
        let names: Vec<&str> = self.player_names().collect();
        let pairs = pairings(&names, &self.config.pairing)?;
        Ok(fixtures(&pairs, self.maps.len(), self.config.swap_seats))
    }

    /// Play every fixture.
    ///
    /// # Errors
    ///
    /// See [`Tournament::run_with`].
    pub fn run(&self) -> Result<TournamentResults, TournamentError> {
        self.run_with(&CancelToken::new(), |_| {})
    }

    /// Play every fixture, calling `on_record` as each match completes.
    ///
    /// Matches run in parallel; `on_record` is called from the calling
    /// thread, in completion order. The returned records are sorted by
    /// fixture. Once `cancel` is set no new match starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule cannot be built, the thread pool
    /// cannot be started, or a match fails for a reason other than a
    /// player fault. An engine fault stops all remaining fixtures.
    pub fn run_with<F>(&self, cancel: &CancelToken, mut on_record: F) -> Result<TournamentResults, TournamentError>
    where
        F: FnMut(&MatchRecord),
    {
        let fixtures = self.fixtures()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .thread_name(|i| format!("match-{i}"))
            .build()
            .map_err(|e| TournamentError::ThreadPool(e.to_string()))?;

        info!(
            players = self.entrants.len(),
            maps = self.maps.len(),
            fixtures = fixtures.len(),
            threads = pool.current_num_threads(),
            "tournament started"
        );

        // Stops new matches after a failure without touching the caller's token.
        let halted = CancelToken::new();
        let (tx, rx) = crossbeam_channel::unbounded::<Message>();

        let mut records = Vec::with_capacity(fixtures.len());
        let mut unplayed = 0usize;
        let mut failure: Option<TournamentError> = None;

        pool.in_place_scope(|scope| {
            for fixture in &fixtures {
                let tx = tx.clone();
                let halted = &halted;
                scope.spawn(move |_| {
                    let message = if cancel.is_cancelled() || halted.is_cancelled() {
                        Message::Unplayed
                    } else {
                        Message::Played(fixture.index, Box::new(self.play(fixture)))
                    };
                    // The collector outlives every worker.
                    let _ = tx.send(message);
                });
            }
            drop(tx);

            // Single collector: the only writer of the results table.
            for message in &rx {
                match message {
                    Message::Unplayed => unplayed += 1,
                    Message::Played(fixture, result) => match *result {
                        Ok(result) => {
                            let record = MatchRecord { fixture, result };
                            on_record(&record);
                            records.push(record);
                        }
                        Err(error) => {
                            halted.cancel();
                            let failed = if matches!(error, MatchError::EngineFault { .. }) {
                                error!(fixture, %error, "engine fault, stopping tournament");
                                TournamentError::EngineFault { fixture, error }
                            } else {
                                error!(fixture, %error, "match failed, stopping tournament");
                                TournamentError::Match { fixture, error }
                            };
                            failure.get_or_insert(failed);
                        }
                    },
                }
            }
        });

        if let Some(failure) = failure {
            return Err(failure);
        }

        records.sort_by_key(|r| r.fixture);
        let cancelled = unplayed > 0;
        if cancelled {
            warn!(played = records.len(), unplayed, "tournament cancelled");
        }
        info!(played = records.len(), "tournament finished");

        Ok(TournamentResults {
            records,
            skipped_maps: self.skipped.clone(),
            unplayed,
            cancelled,
            scoring: self.config.scoring,
        })
    }

    /// Play one fixture with fresh players.
    fn play(&self, fixture: &Fixture) -> Result<MatchResult, MatchError> {
        let players: Vec<Box<dyn Player>> = fixture
            .seats
            .iter()
            .map(|&e| self.entrants[e].create())
            .collect();
        run_match(&self.maps[fixture.map], players, &self.config.game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::{builtin, Idle};

    const DUEL: &str = "P 0 0 1 60 4\nP 6 0 0 10 2\nP 12 0 2 60 4\n";

    fn quick_config() -> TournamentConfig {
        TournamentConfig {
            game: MatchConfig {
                max_turns: 40,
                turn_timeout_ms: None,
            },
            threads: Some(2),
            ..TournamentConfig::default()
        }
    }

    fn tournament(names: &[&str]) -> Tournament {
        let mut t = Tournament::new(quick_config());
        for name in names {
            t.add_player(builtin(name).unwrap()).unwrap();
        }
        t.add_map_text("duel", DUEL).unwrap();
        t
    }

    #[test]
    fn test_tournament_error_display() {
        let err = TournamentError::TooFewPlayers(1);
        assert!(format!("{err}").contains("Too few players"));

        let err = TournamentError::UnknownPlayer("zed".to_string());
        assert!(format!("{err}").contains("zed"));
    }

    #[test]
    fn test_tournament_config_default() {
        let config = TournamentConfig::default();
        assert_eq!(config.game, MatchConfig::default());
        assert_eq!(config.pairing, PairingMode::AllAgainstAll);
        assert!(config.swap_seats);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: TournamentConfig =
            serde_json::from_str(r#"{"swap_seats": false, "game": {"max_turns": 10}}"#).unwrap();
        assert!(!config.swap_seats);
        assert_eq!(config.game.max_turns, 10);
        assert_eq!(config.game.turn_timeout_ms, Some(1000));
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut t = Tournament::new(quick_config());
        t.add_player(Entrant::new("idle", || Box::new(Idle))).unwrap();
        let err = t.add_player(Entrant::new("idle", || Box::new(Idle))).unwrap_err();
        assert!(matches!(err, TournamentError::DuplicatePlayer(_)));
    }

    #[test]
    fn test_too_few_players() {
        let t = tournament(&["idle"]);
        assert!(matches!(t.run(), Err(TournamentError::TooFewPlayers(1))));
    }

    #[test]
    fn test_no_maps() {
        let mut t = Tournament::new(quick_config());
        t.add_player(builtin("idle").unwrap()).unwrap();
        t.add_player(builtin("expander").unwrap()).unwrap();
        assert!(matches!(t.run(), Err(TournamentError::NoMaps)));
    }

    #[test]
    fn test_bad_maps_are_skipped() {
        let mut t = tournament(&["idle", "expander"]);
        assert!(t.add_map_text("broken", "P 1 2 3\n").is_err());
        assert!(t.add_map_text("crowded", "P 0 0 1 5 1\nP 1 0 2 5 1\nP 2 0 3 5 1\n").is_err());

        let results = t.run().unwrap();
        assert_eq!(results.records.len(), 2);
        assert_eq!(results.skipped_maps.len(), 2);
        assert_eq!(results.skipped_maps[0].map, "broken");
        assert_eq!(results.skipped_maps[0].error.line, Some(1));
    }

    #[test]
    fn test_records_sorted_and_tallied() {
        let t = tournament(&["idle", "expander", "strongest-to-weakest"]);
        let results = t.run().unwrap();

        assert_eq!(results.records.len(), 6);
        for (i, r) in results.records.iter().enumerate() {
            assert_eq!(r.fixture, i);
        }

        let tally = results.tally("expander", "duel", "idle");
        assert_eq!(tally.played, 2);
        assert_eq!(tally.wins, 2);
        let reverse = results.tally("idle", "duel", "expander");
        assert_eq!(reverse.losses, 2);

        assert_eq!(results.table().len(), 6);
        assert_eq!(results.standings().len(), 3);
    }

    #[test]
    fn test_cancelled_before_start() {
        let t = tournament(&["idle", "expander"]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let results = t.run_with(&cancel, |_| {}).unwrap();
        assert!(results.records.is_empty());
        assert_eq!(results.unplayed, 2);
        assert!(results.cancelled);
    }
}
