//! Read-only per-turn snapshot handed to players.
//!
//! The view owns its copy of the planets and fleets, so nothing a player
//! does with it can reach the engine. Ownership is shown from the viewer's
//! perspective: the viewer is always [`ME`], the other seats are numbered
//! from 2 upwards in seat order, and neutral stays [`NEUTRAL`]. Planet ids
//! are the real ids, so orders need no translation.

use std::sync::Arc;

use crate::game::{Distances, Fleet, GameState, Planet, PlanetId, PlayerId, NEUTRAL};

/// The viewing player's id inside a [`GameView`].
pub const ME: PlayerId = 1;

/// Map an engine owner id to the viewer's perspective.
#[must_use]
pub const fn perspective(owner: PlayerId, viewer: PlayerId) -> PlayerId {
    if owner == NEUTRAL {
        NEUTRAL
    } else if owner == viewer {
        ME
    } else if owner < viewer {
        owner + 1
    } else {
        owner
    }
}

/// A player's snapshot of the game for one turn.
#[derive(Debug, Clone)]
pub struct GameView {
    /// Turn being played.
    turn: u32,
    /// Last turn of the match.
    max_turns: u32,
    /// Number of seats.
    num_players: usize,
    /// Planets with perspective owners.
    planets: Vec<Planet>,
    /// Fleets with perspective owners.
    fleets: Vec<Fleet>,
    /// Shared distance table.
    distances: Arc<Distances>,
}

impl GameView {
    /// Snapshot `state` as seen by `viewer`.
    #[must_use]
    pub fn new(state: &GameState, viewer: PlayerId) -> Self {
        let planets = state
            .planets()
            .iter()
            .map(|p| Planet {
                owner: perspective(p.owner, viewer),
                ..*p
            })
            .collect();
        let fleets = state
            .fleets()
            .iter()
            .map(|f| Fleet {
                owner: perspective(f.owner, viewer),
                ..*f
            })
            .collect();

        Self {
            turn: state.turn(),
            max_turns: state.max_turns(),
            num_players: state.num_players(),
            planets,
            fleets,
            distances: Arc::clone(state.distances()),
        }
    }

    /// The viewer's own id, always [`ME`].
    #[must_use]
    pub const fn me(&self) -> PlayerId {
        ME
    }

    /// Turn being played (1-based).
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Last turn of the match.
    #[must_use]
    pub const fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Number of seats in the match.
    #[must_use]
    pub const fn num_players(&self) -> usize {
        self.num_players
    }

    /// All planets.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// All fleets in flight.
    #[must_use]
    pub fn fleets(&self) -> &[Fleet] {
        &self.fleets
    }

    /// Get a planet by id.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id)
    }

    /// Planets owned by `owner`.
    pub fn planets_owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(move |p| p.owner == owner)
    }

    /// Planets the viewer owns.
    pub fn my_planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets_owned_by(ME)
    }

    /// Neutral planets.
    pub fn neutral_planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets_owned_by(NEUTRAL)
    }

    /// Planets owned by any other player.
    pub fn enemy_planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets
            .iter()
            .filter(|p| p.owner != ME && p.owner != NEUTRAL)
    }

    /// Planets the viewer does not own (neutral or enemy).
    pub fn not_my_planets(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(|p| p.owner != ME)
    }

    /// Fleets owned by `owner`.
    pub fn fleets_owned_by(&self, owner: PlayerId) -> impl Iterator<Item = &Fleet> {
        self.fleets.iter().filter(move |f| f.owner == owner)
    }

    /// Fleets the viewer launched.
    pub fn my_fleets(&self) -> impl Iterator<Item = &Fleet> {
        self.fleets_owned_by(ME)
    }

    /// Fleets launched by other players.
    pub fn enemy_fleets(&self) -> impl Iterator<Item = &Fleet> {
        self.fleets.iter().filter(|f| f.owner != ME)
    }

    /// Distance between two planets.
    #[must_use]
    pub fn distance(&self, a: PlanetId, b: PlanetId) -> Option<f64> {
        self.distances.distance(a, b)
    }

    /// Turns a fleet launched now from `a` needs to reach `b`.
    #[must_use]
    pub fn travel_turns(&self, a: PlanetId, b: PlanetId) -> Option<u32> {
        self.distances.travel_turns(a, b)
    }

    /// Ships `owner` holds on planets and in flight.
    #[must_use]
    pub fn total_ships(&self, owner: PlayerId) -> u64 {
        let docked: u64 = self
            .planets_owned_by(owner)
            .map(|p| u64::from(p.ships))
            .sum();
        let flying: u64 = self
            .fleets_owned_by(owner)
            .map(|f| u64::from(f.ships))
            .sum();
        docked + flying
    }

    /// Combined growth rate of `owner`'s planets.
    #[must_use]
    pub fn production(&self, owner: PlayerId) -> u64 {
        self.planets_owned_by(owner)
            .map(|p| u64::from(p.growth_rate))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Map, Order};

    fn three_seat_state() -> GameState {
        let map = Map::parse(
            "m",
            "P 0 0 1 10 1\nP 3 4 2 20 2\nP 6 8 3 30 3\nP 9 9 0 5 1\n",
        )
        .unwrap();
        GameState::new(&map, 100)
    }

    #[test]
    fn test_perspective_two_players() {
        assert_eq!(perspective(1, 1), ME);
        assert_eq!(perspective(2, 1), 2);
        assert_eq!(perspective(2, 2), ME);
        assert_eq!(perspective(1, 2), 2);
        assert_eq!(perspective(NEUTRAL, 2), NEUTRAL);
    }

    #[test]
    fn test_perspective_three_players() {
        // Seat 2 sees seat 1 as 2 and seat 3 as 3.
        assert_eq!(perspective(2, 2), ME);
        assert_eq!(perspective(1, 2), 2);
        assert_eq!(perspective(3, 2), 3);
        // Seat 3 sees seats 1 and 2 as 2 and 3.
        assert_eq!(perspective(1, 3), 2);
        assert_eq!(perspective(2, 3), 3);
    }

    #[test]
    fn test_view_sees_itself_as_me() {
        let state = three_seat_state();
        let view = GameView::new(&state, 3);

        assert_eq!(view.me(), ME);
        let mine: Vec<_> = view.my_planets().map(|p| p.id).collect();
        assert_eq!(mine, vec![2]);
        assert_eq!(view.enemy_planets().count(), 2);
        assert_eq!(view.neutral_planets().count(), 1);
        assert_eq!(view.not_my_planets().count(), 3);
        assert_eq!(view.total_ships(ME), 30);
        assert_eq!(view.production(ME), 3);
    }

    #[test]
    fn test_view_fleets_and_distances() {
        let mut state = three_seat_state();
        state.step(&[(2, vec![Order::new(1, 0, 5)])]);

        let view = GameView::new(&state, 2);
        assert_eq!(view.my_fleets().count(), 1);
        assert_eq!(view.enemy_fleets().count(), 0);
        assert_eq!(view.travel_turns(1, 0), Some(5));
        assert!((view.distance(0, 1).unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(view.turn(), 2);

        let other = GameView::new(&state, 1);
        assert_eq!(other.enemy_fleets().count(), 1);
        assert_eq!(other.fleets()[0].owner, 2);
    }

    #[test]
    fn test_view_is_a_snapshot() {
        let mut state = three_seat_state();
        let view = GameView::new(&state, 1);
        state.step(&[(1, vec![Order::new(0, 3, 10)])]);

        assert_eq!(view.planet(0).unwrap().ships, 10);
        assert!(view.fleets().is_empty());
        assert_eq!(state.planets()[0].ships, 1);
    }
}
