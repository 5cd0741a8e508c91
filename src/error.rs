//! Error types for player failures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error a player returns when it cannot produce orders for a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerError {
    message: String,
}

impl PlayerError {
    /// Create a new player error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PlayerError {}

/// A player-attributable failure observed by the match runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerFault {
    /// No answer within the per-turn budget. The turn is played with no
    /// orders from this player.
    Timeout {
        /// Budget that was exceeded, in milliseconds.
        budget_ms: u64,
    },
    /// The player returned an error or panicked. The player forfeits.
    Raised {
        /// Error or panic message.
        message: String,
    },
}

impl PlayerFault {
    /// Whether this fault ends the match for the player.
    #[must_use]
    pub const fn is_forfeit(&self) -> bool {
        matches!(self, Self::Raised { .. })
    }
}

impl fmt::Display for PlayerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { budget_ms } => write!(f, "timed out after {budget_ms} ms"),
            Self::Raised { message } => write!(f, "raised: {message}"),
        }
    }
}

impl std::error::Error for PlayerFault {}

impl From<PlayerError> for PlayerFault {
    fn from(e: PlayerError) -> Self {
        Self::Raised { message: e.message }
    }
}
