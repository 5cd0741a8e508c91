//! Classic Planet Wars viewer playback format.
//!
//! ```text
//! x,y,owner,ships,growth:x,y,owner,ships,growth|frame:frame:...
//! ```
//!
//! The part before `|` is the initial planet layout. Each frame lists every
//! planet as `owner.ships`, followed by every fleet as
//! `owner.ships.source.destination.total_turns.turns_remaining`, all
//! separated by commas.

use std::fmt::Write as _;

use crate::replay::{Replay, TurnFrame};

fn write_frame(out: &mut String, frame: &TurnFrame) {
    let mut first = true;
    let mut sep = |out: &mut String| {
        if !first {
            out.push(',');
        }
        first = false;
    };

    for planet in &frame.planets {
        sep(out);
        let _ = write!(out, "{}.{}", planet.owner, planet.ships);
    }
    for fleet in &frame.fleets {
        sep(out);
        let _ = write!(
            out,
            "{}.{}.{}.{}.{}.{}",
            fleet.owner,
            fleet.ships,
            fleet.source,
            fleet.destination,
            fleet.total_turns,
            fleet.turns_remaining
        );
    }
}

impl Replay {
    /// Render the recording in the viewer playback format.
    ///
    /// The initial state is the layout header, so frames start with the
    /// state after turn 1.
    #[must_use]
    pub fn to_playback_string(&self) -> String {
        let mut out = String::new();

        for (i, planet) in self.planets.iter().enumerate() {
            if i > 0 {
                out.push(':');
            }
            let _ = write!(
                out,
                "{},{},{},{},{}",
                planet.x, planet.y, planet.owner, planet.ships, planet.growth_rate
            );
        }

        out.push('|');
        for (i, frame) in self.turns.iter().skip(1).enumerate() {
            if i > 0 {
                out.push(':');
            }
            write_frame(&mut out, frame);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{GameState, Map, Order};
    use crate::replay::Replay;

    #[test]
    fn test_playback_string() {
        let map = Map::parse("duel", "P 0 0 1 20 2\nP 4 0 2 20 3\n").unwrap();
        let mut state = GameState::new(&map, 10);
        let mut replay = Replay::new(&map, vec!["a".into(), "b".into()], &state);

        state.step(&[(1, vec![Order::new(0, 1, 8)])]);
        replay.record(&state);
        state.step(&[]);
        replay.record(&state);

        assert_eq!(
            replay.to_playback_string(),
            "0,0,1,20,2:4,0,2,20,3|1.14,2.23,1.8.0.1.4.4:1.16,2.26,1.8.0.1.4.3"
        );
    }

    #[test]
    fn test_playback_without_turns() {
        let map = Map::parse("solo", "P 1.5 2 1 5 1\n").unwrap();
        let state = GameState::new(&map, 10);
        let replay = Replay::new(&map, vec!["a".into()], &state);
        assert_eq!(replay.to_playback_string(), "1.5,2,1,5,1|");
    }
}
