//! Fleets in flight.

use serde::{Deserialize, Serialize};

use crate::game::{Planet, PlanetId, PlayerId, Position};

/// Identifier of a fleet, assigned in launch order.
pub type FleetId = u64;

/// Ships travelling between two planets.
///
/// Everything except `turns_remaining` is fixed at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    /// Launch-order identifier.
    pub id: FleetId,
    /// Player that launched the fleet.
    pub owner: PlayerId,
    /// Planet the fleet departed from.
    pub source: PlanetId,
    /// Planet the fleet is heading to.
    pub destination: PlanetId,
    /// Number of ships carried.
    pub ships: u32,
    /// Trip length in turns.
    pub total_turns: u32,
    /// Turns left before arrival.
    pub turns_remaining: u32,
}

impl Fleet {
    /// Fraction of the trip already covered, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_turns == 0 {
            return 1.0;
        }
        let flown = self.total_turns.saturating_sub(self.turns_remaining);
        f64::from(flown) / f64::from(self.total_turns)
    }

    /// Current position, interpolated between source and destination.
    ///
    /// Returns `None` if either endpoint is not in `planets`.
    #[must_use]
    pub fn position(&self, planets: &[Planet]) -> Option<Position> {
        let source = planets.get(self.source)?.position;
        let destination = planets.get(self.destination)?.position;
        Some(source.lerp(destination, self.progress()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(total_turns: u32, turns_remaining: u32) -> Fleet {
        Fleet {
            id: 0,
            owner: 1,
            source: 0,
            destination: 1,
            ships: 5,
            total_turns,
            turns_remaining,
        }
    }

    #[test]
    fn test_progress() {
        assert!((fleet(4, 4).progress() - 0.0).abs() < 1e-12);
        assert!((fleet(4, 1).progress() - 0.75).abs() < 1e-12);
        assert!((fleet(4, 0).progress() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_interpolates() {
        let planets = vec![
            Planet::new(0, Position::new(0.0, 0.0), 1, 0, 0),
            Planet::new(1, Position::new(10.0, 0.0), 0, 0, 0),
        ];
        let pos = fleet(10, 4).position(&planets).unwrap();
        assert!((pos.x - 6.0).abs() < 1e-12);
        assert!(pos.y.abs() < 1e-12);
    }

    #[test]
    fn test_position_unknown_planet() {
        let planets = vec![Planet::new(0, Position::new(0.0, 0.0), 1, 0, 0)];
        assert!(fleet(3, 2).position(&planets).is_none());
    }
}
