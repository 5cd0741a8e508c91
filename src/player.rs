//! The capability every bot implements.

use crate::error::PlayerError;
use crate::game::{GameView, Order};

/// A bot taking part in a match.
///
/// The runner calls [`Player::play_turn`] once per turn with a fresh
/// snapshot. Any memory the bot keeps between turns lives in `self`; the
/// engine never looks at it. Returning an error (or panicking) forfeits
/// the match.
pub trait Player: Send {
    /// Display name used in results and logs.
    fn name(&self) -> &str;

    /// Decide this turn's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the bot cannot continue; the match counts it
    /// as a forfeit.
    fn play_turn(&mut self, view: &GameView) -> Result<Vec<Order>, PlayerError>;
}

impl std::fmt::Debug for dyn Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player").field("name", &self.name()).finish_non_exhaustive()
    }
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn play_turn(&mut self, view: &GameView) -> Result<Vec<Order>, PlayerError> {
        (**self).play_turn(view)
    }
}
