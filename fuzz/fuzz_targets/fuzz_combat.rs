#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use planetwars::game::{resolve_combat, Arrivals, NEUTRAL};

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    /// Owner of the garrison before arrivals.
    garrison_owner: u8,
    /// Garrison size before arrivals.
    garrison_ships: u32,
    /// Landed ships per owner.
    arrivals: Vec<(u8, u32)>,
}

fuzz_target!(|input: CombatInput| {
    // Cap the number of sides to keep runs short
    let owner = input.garrison_owner % 9;
    let mut arrivals = Arrivals::new();
    for (o, ships) in input.arrivals.into_iter().take(8) {
        let slot = arrivals.entry(o % 9).or_default();
        *slot = slot.saturating_add(ships);
    }

    let total = u64::from(input.garrison_ships)
        + arrivals.values().map(|&s| u64::from(s)).sum::<u64>();

    // Must not panic
    let result = resolve_combat(owner, input.garrison_ships, &arrivals);

    // Combat never creates ships
    assert!(
        u64::from(result.ships) <= total,
        "combat created ships: {} > {}",
        result.ships,
        total
    );

    // A planet left with no ships by a contest is neutral
    let contested = arrivals.iter().any(|(&o, &s)| o != owner && s > 0);
    if contested && result.ships == 0 {
        assert_eq!(result.owner, NEUTRAL, "empty contested planet kept an owner");
    }

    // The survivor must have been one of the sides
    if result.owner != NEUTRAL {
        assert!(
            result.owner == owner || arrivals.contains_key(&result.owner),
            "owner {} came from nowhere",
            result.owner
        );
    }
});
