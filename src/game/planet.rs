//! Planets and player identities.

use serde::{Deserialize, Serialize};

use crate::game::Position;

/// Identifier of a player seat. `0` is the neutral owner.
pub type PlayerId = u8;

/// Stable identifier of a planet, assigned in map order starting at zero.
pub type PlanetId = usize;

/// The neutral owner. Neutral planets never grow.
pub const NEUTRAL: PlayerId = 0;

/// A planet on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Stable identifier.
    pub id: PlanetId,
    /// Fixed location.
    pub position: Position,
    /// Current owner ([`NEUTRAL`] if unowned).
    pub owner: PlayerId,
    /// Garrison size.
    pub ships: u32,
    /// Ships added per turn while owned by a player.
    pub growth_rate: u32,
}

impl Planet {
    /// Create a new planet.
    #[must_use]
    pub const fn new(
        id: PlanetId,
        position: Position,
        owner: PlayerId,
        ships: u32,
        growth_rate: u32,
    ) -> Self {
        Self {
            id,
            position,
            owner,
            ships,
            growth_rate,
        }
    }

    /// Whether nobody owns this planet.
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        self.owner == NEUTRAL
    }

    /// Whether `player` owns this planet.
    #[must_use]
    pub const fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player
    }

    /// Euclidean distance to another planet.
    #[must_use]
    pub fn distance_to(&self, other: &Planet) -> f64 {
        self.position.distance(other.position)
    }

    /// Ships this planet will add at the start of the next turn.
    #[must_use]
    pub const fn growth(&self) -> u32 {
        if self.is_neutral() { 0 } else { self.growth_rate }
    }
}
