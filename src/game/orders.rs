//! Orders and their validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Planet, PlanetId, PlayerId};

/// A request to send ships from one planet to another this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Planet the ships leave from.
    pub source: PlanetId,
    /// Planet the ships travel to.
    pub destination: PlanetId,
    /// Number of ships to send.
    pub ships: u32,
}

impl Order {
    /// Create a new order.
    #[must_use]
    pub const fn new(source: PlanetId, destination: PlanetId, ships: u32) -> Self {
        Self {
            source,
            destination,
            ships,
        }
    }
}

/// Why an order was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRejection {
    /// The source planet does not exist.
    UnknownSource(PlanetId),
    /// The source planet belongs to someone else.
    NotOwner {
        /// Source planet.
        planet: PlanetId,
        /// Its actual owner.
        owner: PlayerId,
    },
    /// The destination planet does not exist.
    UnknownDestination(PlanetId),
    /// The order carries no ships.
    NoShips,
    /// The source does not hold enough ships.
    InsufficientShips {
        /// Ships requested.
        requested: u32,
        /// Ships currently stationed at the source.
        available: u32,
    },
}

impl fmt::Display for OrderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource(id) => write!(f, "unknown source planet {id}"),
            Self::NotOwner { planet, owner } => {
                write!(f, "planet {planet} is owned by player {owner}")
            }
            Self::UnknownDestination(id) => write!(f, "unknown destination planet {id}"),
            Self::NoShips => write!(f, "order carries no ships"),
            Self::InsufficientShips {
                requested,
                available,
            } => write!(f, "requested {requested} ships, only {available} available"),
        }
    }
}

impl std::error::Error for OrderRejection {}

/// Check an order against the current planets.
///
/// `planets` must reflect every order of this player applied so far this
/// turn, so several orders from one planet cannot overspend its garrison.
///
/// # Errors
///
/// Returns the first rule the order breaks.
pub fn validate_order(
    planets: &[Planet],
    player: PlayerId,
    order: &Order,
) -> Result<(), OrderRejection> {
    let source = planets
        .get(order.source)
        .ok_or(OrderRejection::UnknownSource(order.source))?;
    if source.owner != player {
        return Err(OrderRejection::NotOwner {
            planet: source.id,
            owner: source.owner,
        });
    }
    if order.destination >= planets.len() {
        return Err(OrderRejection::UnknownDestination(order.destination));
    }
    if order.ships == 0 {
        return Err(OrderRejection::NoShips);
    }
    if order.ships > source.ships {
        return Err(OrderRejection::InsufficientShips {
            requested: order.ships,
            available: source.ships,
        });
    }
    Ok(())
}

/// What happened to one player's orders this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReport {
    /// Orders that became fleets.
    pub accepted: u32,
    /// Dropped orders and the reason for each.
    pub rejected: Vec<(Order, OrderRejection)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Position, NEUTRAL};

    fn planets() -> Vec<Planet> {
        vec![
            Planet::new(0, Position::new(0.0, 0.0), 1, 50, 5),
            Planet::new(1, Position::new(10.0, 0.0), NEUTRAL, 10, 2),
            Planet::new(2, Position::new(0.0, 10.0), 2, 30, 3),
        ]
    }

    #[test]
    fn test_valid_order() {
        assert_eq!(validate_order(&planets(), 1, &Order::new(0, 1, 15)), Ok(()));
        assert_eq!(validate_order(&planets(), 1, &Order::new(0, 1, 50)), Ok(()));
    }

    #[test]
    fn test_self_targeted_order_is_valid() {
        assert_eq!(validate_order(&planets(), 1, &Order::new(0, 0, 5)), Ok(()));
    }

    #[test]
    fn test_unknown_source() {
        assert_eq!(
            validate_order(&planets(), 1, &Order::new(9, 1, 5)),
            Err(OrderRejection::UnknownSource(9))
        );
    }

    #[test]
    fn test_not_owner() {
        assert_eq!(
            validate_order(&planets(), 1, &Order::new(2, 1, 5)),
            Err(OrderRejection::NotOwner { planet: 2, owner: 2 })
        );
        assert_eq!(
            validate_order(&planets(), 1, &Order::new(1, 0, 5)),
            Err(OrderRejection::NotOwner {
                planet: 1,
                owner: NEUTRAL
            })
        );
    }

    #[test]
    fn test_unknown_destination() {
        assert_eq!(
            validate_order(&planets(), 1, &Order::new(0, 3, 5)),
            Err(OrderRejection::UnknownDestination(3))
        );
    }

    #[test]
    fn test_no_ships() {
        assert_eq!(
            validate_order(&planets(), 1, &Order::new(0, 1, 0)),
            Err(OrderRejection::NoShips)
        );
    }

    #[test]
    fn test_insufficient_ships() {
        let err = validate_order(&planets(), 1, &Order::new(0, 1, 51)).unwrap_err();
        assert_eq!(
            err,
            OrderRejection::InsufficientShips {
                requested: 51,
                available: 50
            }
        );
        assert!(err.to_string().contains("51"));
    }
}
