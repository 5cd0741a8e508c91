//! CLI command implementations for Planet Wars.

pub(crate) mod bots;
pub(crate) mod run;
pub(crate) mod tournament;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

use planetwars::runner::MatchConfig;
use planetwars::tournament::Entrant;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<planetwars::tournament::TournamentError> for CliError {
    fn from(e: planetwars::tournament::TournamentError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<planetwars::replay::ReplayError> for CliError {
    fn from(e: planetwars::replay::ReplayError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<planetwars::runner::MatchError> for CliError {
    fn from(e: planetwars::runner::MatchError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<planetwars::game::MapFormatError> for CliError {
    fn from(e: planetwars::game::MapFormatError) -> Self {
        Self::new(e.to_string())
    }
}

/// Resolve a built-in bot by name.
fn entrant(name: &str) -> Result<Entrant, CliError> {
    planetwars::bots::builtin(name).ok_or_else(|| {
        CliError::new(format!(
            "Unknown bot '{name}' (run 'planetwars bots' for the list)"
        ))
    })
}

/// Apply command-line overrides to a match config. A timeout of 0 turns
/// the per-turn budget off.
fn override_match(config: &mut MatchConfig, turns: Option<u32>, timeout_ms: Option<u64>) {
    if let Some(t) = turns {
        config.max_turns = t;
    }
    if let Some(ms) = timeout_ms {
        config.turn_timeout_ms = (ms > 0).then_some(ms);
    }
}
