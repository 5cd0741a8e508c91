//! Game invariants - sanity checks that detect engine bugs.
//!
//! Orders are validated before they touch the state, so none of these can
//! trigger from player input. A violation means the engine itself is wrong
//! and the match cannot be trusted.

use crate::game::{GameState, TurnEvents, NEUTRAL};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all structural invariants of a game state.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let planet_count = state.planets.len();
    let num_players = state.num_players;

    for (idx, planet) in state.planets.iter().enumerate() {
        if planet.id != idx {
            violations.push(violation(format!(
                "Planet at index {idx} carries id {}",
                planet.id
            )));
        }
        if usize::from(planet.owner) > num_players {
            violations.push(violation(format!(
                "Planet {} owned by unknown player {}",
                planet.id, planet.owner
            )));
        }
    }

    let mut last_id = None;
    for fleet in &state.fleets {
        if fleet.source >= planet_count {
            violations.push(violation(format!(
                "Fleet {} departs from unknown planet {}",
                fleet.id, fleet.source
            )));
        }
        if fleet.destination >= planet_count {
            violations.push(violation(format!(
                "Fleet {} heads to unknown planet {}",
                fleet.id, fleet.destination
            )));
        }
        if fleet.owner == NEUTRAL || usize::from(fleet.owner) > num_players {
            violations.push(violation(format!(
                "Fleet {} owned by invalid player {}",
                fleet.id, fleet.owner
            )));
        }
        if fleet.ships == 0 {
            violations.push(violation(format!("Fleet {} carries no ships", fleet.id)));
        }
        if fleet.turns_remaining == 0 || fleet.turns_remaining > fleet.total_turns {
            violations.push(violation(format!(
                "Fleet {} has {} of {} turns remaining",
                fleet.id, fleet.turns_remaining, fleet.total_turns
            )));
        }
        if last_id.is_some_and(|last| fleet.id <= last) {
            violations.push(violation(format!("Fleet {} out of launch order", fleet.id)));
        }
        if fleet.id >= state.next_fleet_id {
            violations.push(violation(format!(
                "Fleet {} was never issued (next id {})",
                fleet.id, state.next_fleet_id
            )));
        }
        last_id = Some(fleet.id);
    }

    violations
}

/// Check ship conservation across the growth, arrival and combat phases.
///
/// `before` is [`GameState::total_ships`] taken before
/// [`GameState::begin_turn`]; the current total must equal it plus growth
/// minus combat losses.
#[must_use]
pub fn check_conservation(
    before: u64,
    state: &GameState,
    events: &TurnEvents,
) -> Option<InvariantViolation> {
    let expected = (before + events.growth).checked_sub(events.destroyed);
    let actual = state.total_ships();
    if expected == Some(actual) {
        None
    } else {
        Some(violation(format!(
            "Turn {}: {actual} ships present, expected {before} + {} growth - {} destroyed",
            events.turn, events.growth, events.destroyed
        )))
    }
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Fleet, Map, Order};

    fn create_valid_game() -> GameState {
        let map = Map::parse("m", "P 0 0 1 50 5\nP 10 0 0 10 2\nP 0 10 2 50 5\n").unwrap();
        let mut state = GameState::new(&map, 100);
        state.step(&[
            (1, vec![Order::new(0, 1, 20)]),
            (2, vec![Order::new(2, 1, 20)]),
        ]);
        state
    }

    #[test]
    fn test_valid_game_passes() {
        let state = create_valid_game();
        assert!(check_invariants(&state).is_empty());
        assert_invariants(&state);
    }

    #[test]
    fn test_fleet_to_unknown_planet() {
        let mut state = create_valid_game();
        state.fleets[0].destination = 42;
        let violations = check_invariants(&state);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unknown planet 42"));
    }

    #[test]
    fn test_unknown_owner() {
        let mut state = create_valid_game();
        state.planets[1].owner = 7;
        let violations = check_invariants(&state);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("unknown player 7"));
    }

    #[test]
    fn test_neutral_fleet() {
        let mut state = create_valid_game();
        state.fleets[1].owner = NEUTRAL;
        assert_eq!(check_invariants(&state).len(), 1);
    }

    #[test]
    fn test_fleet_bookkeeping() {
        let mut state = create_valid_game();
        state.fleets.push(Fleet {
            id: 0,
            owner: 1,
            source: 0,
            destination: 1,
            ships: 0,
            total_turns: 3,
            turns_remaining: 4,
        });
        // No ships, too many turns remaining, out of launch order
        assert_eq!(check_invariants(&state).len(), 3);
    }

    #[test]
    fn test_conservation_holds() {
        let mut state = create_valid_game();
        for _ in 0..12 {
            let before = state.total_ships();
            let events = state.begin_turn();
            assert_eq!(check_conservation(before, &state, &events), None);
            state.advance_turn();
        }
    }

    #[test]
    fn test_conservation_detects_leak() {
        let mut state = create_valid_game();
        let before = state.total_ships();
        let events = state.begin_turn();
        state.planets[0].ships += 1;
        assert!(check_conservation(before, &state, &events).is_some());
    }

    #[test]
    #[should_panic(expected = "Game invariant violations")]
    #[cfg(debug_assertions)]
    fn test_assert_invariants_panics() {
        let mut state = create_valid_game();
        state.planets[0].owner = 9;
        assert_invariants(&state);
    }
}
