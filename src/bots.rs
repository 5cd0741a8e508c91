//! Built-in reference bots.
//!
//! Small deterministic strategies that give the CLI, tests and benchmarks
//! something to play against. They are not meant to be strong.

use std::collections::BTreeSet;

use crate::error::PlayerError;
use crate::game::{GameView, Order, Planet, PlanetId, NEUTRAL};
use crate::player::Player;
use crate::tournament::Entrant;

/// Names of the built-in bots, in listing order.
pub const BUILTIN_BOTS: &[(&str, &str)] = &[
    ("idle", "never issues an order"),
    (
        "strongest-to-weakest",
        "with nothing in flight, sends half of its strongest garrison to the weakest planet it does not own",
    ),
    (
        "expander",
        "every planet captures the cheapest affordable planet, nearest first",
    ),
];

/// Look up a built-in bot by name.
#[must_use]
pub fn builtin(name: &str) -> Option<Entrant> {
    let entrant = match name {
        "idle" => Entrant::new(name, || Box::new(Idle)),
        "strongest-to-weakest" => Entrant::new(name, || Box::new(StrongestToWeakest)),
        "expander" => Entrant::new(name, || Box::new(Expander)),
        _ => return None,
    };
    Some(entrant)
}

/// Does nothing, every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Player for Idle {
    fn name(&self) -> &str {
        "idle"
    }

    fn play_turn(&mut self, _view: &GameView) -> Result<Vec<Order>, PlayerError> {
        Ok(Vec::new())
    }
}

/// Attacks the weakest planet it does not own from its strongest planet.
///
/// Waits until its previous fleet has landed before launching another.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongestToWeakest;

impl Player for StrongestToWeakest {
    fn name(&self) -> &str {
        "strongest-to-weakest"
    }

    fn play_turn(&mut self, view: &GameView) -> Result<Vec<Order>, PlayerError> {
        if view.my_fleets().next().is_some() {
            return Ok(Vec::new());
        }

        // Ties go to the lowest id so the choice is stable.
        let Some(source) = view
            .my_planets()
            .max_by(|a, b| a.ships.cmp(&b.ships).then(b.id.cmp(&a.id)))
        else {
            return Ok(Vec::new());
        };
        let Some(target) = view
            .not_my_planets()
            .min_by(|a, b| a.ships.cmp(&b.ships).then(a.id.cmp(&b.id)))
        else {
            return Ok(Vec::new());
        };

        let ships = source.ships / 2;
        if ships == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![Order::new(source.id, target.id, ships)])
    }
}

/// Grows by capturing the cheapest planets in reach.
///
/// Each owned planet picks, among planets not already targeted, the one it
/// can take for the fewest ships (nearest first on ties), accounting for
/// enemy growth during the flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct Expander;

impl Expander {
    fn cost(view: &GameView, source: &Planet, target: &Planet) -> Option<(u32, u32)> {
        let turns = view.travel_turns(source.id, target.id)?;
        let growth = if target.owner == NEUTRAL {
            0
        } else {
            target.growth_rate.saturating_mul(turns)
        };
        let needed = target.ships.saturating_add(growth).saturating_add(1);
        Some((needed, turns))
    }
}

impl Player for Expander {
    fn name(&self) -> &str {
        "expander"
    }

    fn play_turn(&mut self, view: &GameView) -> Result<Vec<Order>, PlayerError> {
        let mut targeted: BTreeSet<PlanetId> = view.my_fleets().map(|f| f.destination).collect();
        let mut orders = Vec::new();

        let mut sources: Vec<&Planet> = view.my_planets().collect();
        sources.sort_by(|a, b| b.ships.cmp(&a.ships).then(a.id.cmp(&b.id)));

        for source in sources {
            // Keep one ship home so the planet is not left empty.
            let budget = source.ships.saturating_sub(1);
            let best = view
                .not_my_planets()
                .filter(|t| !targeted.contains(&t.id))
                .filter_map(|t| Self::cost(view, source, t).map(|(needed, turns)| (t.id, needed, turns)))
                .filter(|&(_, needed, _)| needed <= budget)
                .min_by_key(|&(id, needed, turns)| (needed, turns, id));

            if let Some((target, needed, _)) = best {
                targeted.insert(target);
                orders.push(Order::new(source.id, target, needed));
            }
        }

        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, Map};

    fn view_of(text: &str, viewer: u8) -> GameView {
        let map = Map::parse("m", text).unwrap();
        GameView::new(&GameState::new(&map, 100), viewer)
    }

    #[test]
    fn test_builtin_lookup() {
        for (name, _) in BUILTIN_BOTS {
            let entrant = builtin(name).unwrap();
            assert_eq!(entrant.name(), *name);
            assert_eq!(entrant.create().name(), *name);
        }
        assert!(builtin("nobody").is_none());
    }

    #[test]
    fn test_idle_never_orders() {
        let view = view_of("P 0 0 1 50 5\nP 3 0 2 5 1\n", 1);
        assert!(Idle.play_turn(&view).unwrap().is_empty());
    }

    #[test]
    fn test_strongest_to_weakest() {
        let view = view_of("P 0 0 1 50 5\nP 3 0 1 10 1\nP 6 0 0 4 1\nP 9 0 2 30 1\n", 1);
        let orders = StrongestToWeakest.play_turn(&view).unwrap();
        assert_eq!(orders, vec![Order::new(0, 2, 25)]);
    }

    #[test]
    fn test_strongest_to_weakest_as_second_seat() {
        let view = view_of("P 0 0 1 50 5\nP 9 0 2 30 1\n", 2);
        let orders = StrongestToWeakest.play_turn(&view).unwrap();
        assert_eq!(orders, vec![Order::new(1, 0, 15)]);
    }

    #[test]
    fn test_expander_spreads_targets() {
        let view = view_of(
            "P 0 0 1 30 5\nP 0 1 1 30 5\nP 2 0 0 5 1\nP 0 3 0 6 1\nP 9 9 2 50 1\n",
            1,
        );
        let orders = Expander.play_turn(&view).unwrap();
        assert_eq!(orders.len(), 2);
        let targets: BTreeSet<_> = orders.iter().map(|o| o.destination).collect();
        assert_eq!(targets, BTreeSet::from([2, 3]));
        assert!(orders.iter().all(|o| o.ships <= 29));
    }

    #[test]
    fn test_expander_respects_budget() {
        let view = view_of("P 0 0 1 5 5\nP 2 0 0 10 1\nP 9 9 2 50 1\n", 1);
        assert!(Expander.play_turn(&view).unwrap().is_empty());
    }
}
