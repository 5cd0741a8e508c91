// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Planet Wars: a deterministic simulation and tournament engine.
//!
//! This crate provides:
//! - A turn-based Planet Wars engine with exact, reproducible outcomes
//! - A [`Player`] trait for plugging in bots
//! - A match runner with per-turn time budgets and forfeits
//! - A parallel tournament orchestrator with CSV/JSON export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Tournament Orchestrator      │
//! ├─────────────────────────────────────┤
//! │   Match Runner   │  Replay export   │
//! ├─────────────────────────────────────┤
//! │  Game state · combat · orders       │
//! ├─────────────────────────────────────┤
//! │  Map loader · spatial model         │
//! └─────────────────────────────────────┘
//! ```

pub mod bots;
pub mod error;
pub mod game;
pub mod player;
pub mod replay;
pub mod runner;
pub mod tournament;

pub use error::{PlayerError, PlayerFault};

// Re-export key types at crate root for convenience
pub use game::{GameState, GameView, Map, Order, Planet, PlanetId, PlayerId};
pub use player::Player;
pub use runner::{run_match, MatchConfig, MatchError, MatchResult, Outcome};
pub use tournament::{Entrant, Tournament, TournamentConfig, TournamentResults};
