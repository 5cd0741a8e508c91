#![no_main]

//! Map parser fuzzer.
//!
//! Arbitrary text must either parse into a consistent map or produce an
//! error; it must never panic. Parsed maps must survive a write/parse cycle.

use libfuzzer_sys::fuzz_target;
use planetwars::game::{check_invariants, GameState, Map};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(map) = Map::parse("fuzz", text) else {
        return;
    };

    assert!(!map.planets().is_empty(), "parsed map has no planets");
    for (idx, planet) in map.planets().iter().enumerate() {
        assert_eq!(planet.id, idx, "planet ids must follow map order");
        assert!(usize::from(planet.owner) <= map.player_count());
    }

    let state = GameState::new(&map, 10);
    let violations = check_invariants(&state);
    assert!(violations.is_empty(), "fresh state inconsistent: {violations:?}");

    let again = Map::parse("fuzz", &map.to_map_string()).expect("written map must parse");
    assert_eq!(again.player_count(), map.player_count());
    assert_eq!(again.planets().len(), map.planets().len());
});
