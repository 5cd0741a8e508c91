#![no_main]

//! Full game turn fuzzer.
//!
//! This fuzz target exercises the complete turn sequence:
//! 1. Growth
//! 2. Fleet arrivals and combat
//! 3. Order validation and fleet launches
//!
//! Arbitrary orders, most of them invalid, must never break ship
//! conservation or the engine's invariants.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use planetwars::game::{check_invariants, GameState, Map, Order};

/// A fuzzer-generated planet.
#[derive(Arbitrary, Debug, Clone)]
struct FuzzPlanet {
    x: u8,
    y: u8,
    owner: u8,
    ships: u16,
    growth: u8,
}

/// A fuzzer-generated order.
#[derive(Arbitrary, Debug, Clone)]
struct FuzzOrder {
    player: u8,
    source: u8,
    destination: u8,
    ships: u16,
}

/// Structured input for full game turn fuzzing.
#[derive(Arbitrary, Debug)]
struct GameTurnInput {
    /// Planets beyond the two home planets.
    planets: Vec<FuzzPlanet>,
    /// Orders per turn.
    turns: Vec<Vec<FuzzOrder>>,
}

fuzz_target!(|input: GameTurnInput| {
    // Always seat two players, then add up to 14 more planets
    let mut text = String::from("P 0 0 1 100 5\nP 20 20 2 100 5\n");
    for p in input.planets.iter().take(14) {
        text.push_str(&format!(
            "P {} {} {} {} {}\n",
            p.x % 32,
            p.y % 32,
            p.owner % 3,
            p.ships,
            p.growth % 8
        ));
    }
    let map = Map::parse("fuzz", &text).expect("generated map must parse");
    let mut game = GameState::new(&map, 50);

    for raw in input.turns.iter().take(50) {
        let mut orders: Vec<(u8, Vec<Order>)> = vec![(1, Vec::new()), (2, Vec::new())];
        for o in raw.iter().take(16) {
            let seat = usize::from(o.player % 2);
            orders[seat].1.push(Order::new(
                usize::from(o.source % 16),
                usize::from(o.destination % 16),
                u32::from(o.ships),
            ));
        }

        let before = game.total_ships();
        let events = game.step(&orders);

        assert_eq!(
            game.total_ships(),
            before + events.growth - events.destroyed,
            "ship conservation violated on turn {}",
            events.turn
        );
        let violations = check_invariants(&game);
        assert!(
            violations.is_empty(),
            "invariants violated on turn {}: {:?}",
            events.turn,
            violations
        );

        if game.is_game_over() {
            break;
        }
    }
});
