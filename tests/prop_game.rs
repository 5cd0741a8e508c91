//! Property-based tests for game mechanics.
//!
//! These tests verify properties of combat, travel time and whole turns.
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use planetwars::game::{
    check_invariants, resolve_combat, travel_turns, Arrivals, GameState, Map, Order, NEUTRAL,
};

/// A random two-player map with a handful of neutral planets.
fn arb_map() -> impl Strategy<Value = Map> {
    prop::collection::vec((0u8..30, 0u8..30, 0u32..100, 0u32..6), 1..8).prop_map(|neutrals| {
        let mut text = String::from("P 0 0 1 100 5\nP 30 30 2 100 5\n");
        for (x, y, ships, growth) in neutrals {
            text.push_str(&format!("P {x} {y} 0 {ships} {growth}\n"));
        }
        Map::parse("random", &text).unwrap()
    })
}

/// Raw orders; many of them will be invalid on purpose.
fn arb_orders() -> impl Strategy<Value = Vec<(u8, Order)>> {
    prop::collection::vec(
        (1u8..=2, 0usize..10, 0usize..10, 0u32..150).prop_map(|(p, s, d, n)| (p, Order::new(s, d, n))),
        0..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Combat never creates ships and the survivor holds the margin of victory.
    #[test]
    fn prop_combat_bounded(
        owner in 0u8..4,
        garrison in 0u32..100_000,
        arrivals in prop::collection::btree_map(0u8..4, 0u32..100_000, 0..4)
    ) {
        let arrivals: Arrivals = arrivals;
        let total = u64::from(garrison) + arrivals.values().map(|&s| u64::from(s)).sum::<u64>();
        let result = resolve_combat(owner, garrison, &arrivals);

        prop_assert!(u64::from(result.ships) <= total);
        if result.owner == NEUTRAL && result.ships == 0 {
            return Ok(());
        }
        let contested = arrivals.iter().any(|(&o, &s)| o != owner && s > 0);
        if !contested {
            prop_assert_eq!(result.owner, owner);
            prop_assert_eq!(u64::from(result.ships), total);
        }
    }

    /// Two equal strongest sides always leave the planet neutral and empty.
    #[test]
    fn prop_combat_tie_goes_neutral(ships in 1u32..100_000, garrison_owner in 1u8..3) {
        let attacker = if garrison_owner == 1 { 2 } else { 1 };
        let arrivals: Arrivals = [(attacker, ships)].into_iter().collect();
        let result = resolve_combat(garrison_owner, ships, &arrivals);
        prop_assert_eq!(result.owner, NEUTRAL);
        prop_assert_eq!(result.ships, 0);
    }

    /// Travel time is at least one turn and grows with distance.
    #[test]
    fn prop_travel_turns_monotone(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(travel_turns(near) >= 1);
        prop_assert!(travel_turns(near) <= travel_turns(far));
    }

    /// Whatever the players order, every turn conserves ships and keeps the
    /// state consistent.
    #[test]
    fn prop_turns_conserve_ships(map in arb_map(), turns in prop::collection::vec(arb_orders(), 1..20)) {
        let mut game = GameState::new(&map, 100);
        for raw in turns {
            let mut orders: Vec<(u8, Vec<Order>)> = vec![(1, Vec::new()), (2, Vec::new())];
            for (player, order) in raw {
                orders[usize::from(player) - 1].1.push(order);
            }

            let before = game.total_ships();
            let events = game.step(&orders);
            prop_assert_eq!(game.total_ships(), before + events.growth - events.destroyed);
            let violations = check_invariants(&game);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }
}
