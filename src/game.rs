//! Game layer for Planet Wars.
//!
//! Implements the rules of a match:
//! - Planets and fleets on a continuous plane
//! - Map loading from the text format
//! - Growth, fleet arrival and combat
//! - Order validation and fleet launch
//! - Per-player snapshots handed to bots

mod combat;
mod fleet;
mod invariants;
mod map;
mod orders;
mod planet;
mod spatial;
mod state;
mod view;

pub use combat::{resolve_combat, Arrivals, CombatResult};
pub use fleet::{Fleet, FleetId};
pub use invariants::{assert_invariants, check_conservation, check_invariants, InvariantViolation};
pub use map::{Map, MapFormatError, MapFormatErrorKind};
pub use orders::{validate_order, Order, OrderRejection, OrderReport};
pub use planet::{Planet, PlanetId, PlayerId, NEUTRAL};
pub use spatial::{travel_turns, Distances, Position, FLEET_SPEED};
pub use state::{Battle, GameState, TurnEvents};
pub use view::{perspective, GameView, ME};
