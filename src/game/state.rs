//! Game state management.
//!
//! A turn runs in a fixed order: growth, fleet arrivals, combat, then new
//! orders, then the turn counter advances. Growth is credited before combat
//! so a defender benefits from this turn's production, and orders are
//! validated against the post-combat garrison so no player can spend ships
//! that are about to be lost.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::game::{
    resolve_combat, validate_order, Arrivals, Distances, Fleet, FleetId, Map, Order,
    OrderRejection, OrderReport, Planet, PlanetId, PlayerId, NEUTRAL,
};

/// Combat that took place at one planet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    /// Planet fought over.
    pub planet: PlanetId,
    /// Owner before combat.
    pub previous_owner: PlayerId,
    /// Garrison before combat.
    pub previous_ships: u32,
    /// Ships that arrived, per owner.
    pub arrivals: Arrivals,
    /// Owner after combat.
    pub owner: PlayerId,
    /// Garrison after combat.
    pub ships: u32,
}

/// Everything that happened during the growth, arrival and combat phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnEvents {
    /// Turn these events belong to.
    pub turn: u32,
    /// Ships added by growth.
    pub growth: u64,
    /// Fleets that reached their destination.
    pub arrived_fleets: usize,
    /// Contested arrivals.
    pub battles: Vec<Battle>,
    /// Ships lost in combat.
    pub destroyed: u64,
    /// Order outcome per player (filled by [`GameState::step`]).
    pub orders: BTreeMap<PlayerId, OrderReport>,
}

/// Complete state of one match.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Planets, indexed by id.
    pub(crate) planets: Vec<Planet>,
    /// Fleets in flight, in launch order.
    pub(crate) fleets: Vec<Fleet>,
    /// Pairwise distances, shared with player views.
    pub(crate) distances: Arc<Distances>,
    /// Turn currently being played (1-based).
    pub(crate) turn: u32,
    /// Last turn that will be played.
    pub(crate) max_turns: u32,
    /// Id for the next launched fleet.
    pub(crate) next_fleet_id: FleetId,
    /// Number of player seats.
    pub(crate) num_players: usize,
}

impl GameState {
    /// Create the initial state for a map. No fleets are in flight.
    #[must_use]
    pub fn new(map: &Map, max_turns: u32) -> Self {
        let planets = map.planets().to_vec();
        let distances = Arc::new(Distances::new(&planets));
        Self {
            planets,
            fleets: Vec::new(),
            distances,
            turn: 1,
            max_turns,
            next_fleet_id: 0,
            num_players: map.player_count(),
        }
    }

    /// Turn currently being played (1-based).
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Last turn that will be played.
    #[must_use]
    pub const fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Number of completed turns.
    #[must_use]
    pub const fn turns_played(&self) -> u32 {
        self.turn.saturating_sub(1)
    }

    /// Number of player seats.
    #[must_use]
    pub const fn num_players(&self) -> usize {
        self.num_players
    }

    /// All planets, indexed by id.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Get a planet by id.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id)
    }

    /// Fleets in flight, in launch order.
    #[must_use]
    pub fn fleets(&self) -> &[Fleet] {
        &self.fleets
    }

    /// Shared distance table.
    #[must_use]
    pub fn distances(&self) -> &Arc<Distances> {
        &self.distances
    }

    /// Seated player ids, `1..=num_players`.
    pub fn seats(&self) -> impl Iterator<Item = PlayerId> + use<> {
        #[allow(clippy::cast_possible_truncation)]
        let last = self.num_players as PlayerId;
        1..=last
    }

    /// Ships on planets plus ships in flight, all owners.
    #[must_use]
    pub fn total_ships(&self) -> u64 {
        let docked: u64 = self.planets.iter().map(|p| u64::from(p.ships)).sum();
        let flying: u64 = self.fleets.iter().map(|f| u64::from(f.ships)).sum();
        docked + flying
    }

    /// Ships a player holds on planets and in flight.
    #[must_use]
    pub fn ships_of(&self, player: PlayerId) -> u64 {
        let docked: u64 = self
            .planets
            .iter()
            .filter(|p| p.owner == player)
            .map(|p| u64::from(p.ships))
            .sum();
        docked + self.fleet_ships_of(player)
    }

    /// Ships a player has in flight.
    #[must_use]
    pub fn fleet_ships_of(&self, player: PlayerId) -> u64 {
        self.fleets
            .iter()
            .filter(|f| f.owner == player)
            .map(|f| u64::from(f.ships))
            .sum()
    }

    /// Number of planets a player owns.
    #[must_use]
    pub fn planets_of(&self, player: PlayerId) -> u32 {
        let count = self.planets.iter().filter(|p| p.owner == player).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Combined growth rate of a player's planets.
    #[must_use]
    pub fn production_of(&self, player: PlayerId) -> u64 {
        self.planets
            .iter()
            .filter(|p| p.owner == player)
            .map(|p| u64::from(p.growth_rate))
            .sum()
    }

    /// Players still in the game: owners of at least one planet with ships.
    ///
    /// Fleets in flight do not count.
    #[must_use]
    pub fn present_players(&self) -> BTreeSet<PlayerId> {
        self.planets
            .iter()
            .filter(|p| p.owner != NEUTRAL && p.ships > 0)
            .map(|p| p.owner)
            .collect()
    }

    /// Check if the game is over.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        // Game ends once the last allowed turn has been played
        if self.turn > self.max_turns {
            return true;
        }

        // Game ends if fewer than two players remain
        self.present_players().len() < 2
    }

    /// Growth phase: every owned planet gains its growth rate.
    ///
    /// Returns the number of ships added.
    pub fn apply_growth(&mut self) -> u64 {
        let mut added = 0u64;
        for planet in &mut self.planets {
            let before = planet.ships;
            planet.ships = planet.ships.saturating_add(planet.growth());
            added += u64::from(planet.ships - before);
        }
        added
    }

    /// Arrival phase: advance every fleet and collect those that landed.
    ///
    /// Returns the landed ships per destination planet and owner, and the
    /// number of fleets that arrived.
    pub fn advance_fleets(&mut self) -> (BTreeMap<PlanetId, Arrivals>, usize) {
        let mut arrivals: BTreeMap<PlanetId, Arrivals> = BTreeMap::new();
        let mut landed = 0usize;

        self.fleets.retain_mut(|fleet| {
            fleet.turns_remaining = fleet.turns_remaining.saturating_sub(1);
            if fleet.turns_remaining > 0 {
                return true;
            }
            let slot = arrivals
                .entry(fleet.destination)
                .or_default()
                .entry(fleet.owner)
                .or_default();
            *slot = slot.saturating_add(fleet.ships);
            landed += 1;
            false
        });

        (arrivals, landed)
    }

    /// Combat phase: settle every planet that received ships.
    ///
    /// Returns the contested battles and the number of ships destroyed.
    pub fn resolve_arrivals(&mut self, arrivals: BTreeMap<PlanetId, Arrivals>) -> (Vec<Battle>, u64) {
        let mut battles = Vec::new();
        let mut destroyed = 0u64;

        for (planet_id, incoming) in arrivals {
            let Some(planet) = self.planets.get_mut(planet_id) else {
                continue;
            };

            let result = resolve_combat(planet.owner, planet.ships, &incoming);
            let landed: u64 = incoming.values().map(|&s| u64::from(s)).sum();
            let present = u64::from(planet.ships) + landed;
            destroyed += present.saturating_sub(u64::from(result.ships));

            let contested = incoming.keys().any(|&owner| owner != planet.owner);
            if contested {
                let battle = Battle {
                    planet: planet_id,
                    previous_owner: planet.owner,
                    previous_ships: planet.ships,
                    arrivals: incoming,
                    owner: result.owner,
                    ships: result.ships,
                };
                debug!(
                    turn = self.turn,
                    planet = planet_id,
                    from = battle.previous_owner,
                    to = battle.owner,
                    ships = battle.ships,
                    "battle resolved"
                );
                battles.push(battle);
            }

            planet.owner = result.owner;
            planet.ships = result.ships;
        }

        (battles, destroyed)
    }

    /// Run the growth, arrival and combat phases of the current turn.
    pub fn begin_turn(&mut self) -> TurnEvents {
        let growth = self.apply_growth();
        let (arrivals, arrived_fleets) = self.advance_fleets();
        let (battles, destroyed) = self.resolve_arrivals(arrivals);

        TurnEvents {
            turn: self.turn,
            growth,
            arrived_fleets,
            battles,
            destroyed,
            orders: BTreeMap::new(),
        }
    }

    /// Order phase for one player: validate and launch in submission order.
    ///
    /// Invalid orders are dropped and reported; they never affect the state.
    pub fn issue_orders(&mut self, player: PlayerId, orders: &[Order]) -> OrderReport {
        let mut report = OrderReport::default();

        for order in orders {
            if let Err(reason) = validate_order(&self.planets, player, order) {
                debug!(turn = self.turn, player, ?order, %reason, "order rejected");
                report.rejected.push((*order, reason));
                continue;
            }

            let Some(turns) = self.distances.travel_turns(order.source, order.destination) else {
                report
                    .rejected
                    .push((*order, OrderRejection::UnknownDestination(order.destination)));
                continue;
            };

            // Validated above: the source exists and holds enough ships
            if let Some(source) = self.planets.get_mut(order.source) {
                source.ships -= order.ships;
            }

            self.fleets.push(Fleet {
                id: self.next_fleet_id,
                owner: player,
                source: order.source,
                destination: order.destination,
                ships: order.ships,
                total_turns: turns,
                turns_remaining: turns,
            });
            self.next_fleet_id += 1;
            report.accepted += 1;
        }

        report
    }

    /// Advance to the next turn.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Play one complete turn with the given orders.
    ///
    /// Orders are applied per player in ascending player id order, each
    /// player's orders in submission order.
    pub fn step(&mut self, orders: &[(PlayerId, Vec<Order>)]) -> TurnEvents {
        let mut events = self.begin_turn();

        let mut sorted: Vec<&(PlayerId, Vec<Order>)> = orders.iter().collect();
        sorted.sort_by_key(|(player, _)| *player);
        for (player, list) in sorted {
            let report = self.issue_orders(*player, list);
            events.orders.insert(*player, report);
        }

        self.advance_turn();
        events
    }
}
