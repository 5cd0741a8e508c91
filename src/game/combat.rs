//! Combat resolution.
//!
//! Every party present at a planet (the garrison counts for its owner, even
//! when neutral) contributes its total strength. The strictly strongest
//! party keeps its strength minus the combined strength of everybody else.
//! A tie for the top, or a non-positive remainder, leaves the planet neutral
//! and empty.

use std::collections::BTreeMap;

use crate::game::{PlayerId, NEUTRAL};

/// Ships arriving at one planet this turn, grouped by owner.
pub type Arrivals = BTreeMap<PlayerId, u32>;

/// Outcome of combat on a single planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatResult {
    /// Owner after combat ([`NEUTRAL`] if nobody survived).
    pub owner: PlayerId,
    /// Garrison after combat.
    pub ships: u32,
}

/// Resolve combat on a planet.
///
/// `garrison_owner`/`garrison_ships` describe the planet before arrivals;
/// `arrivals` holds this turn's incoming ships per owner.
#[must_use]
pub fn resolve_combat(
    garrison_owner: PlayerId,
    garrison_ships: u32,
    arrivals: &Arrivals,
) -> CombatResult {
    let contested = arrivals
        .iter()
        .any(|(&owner, &ships)| owner != garrison_owner && ships > 0);

    if !contested {
        let reinforcements: u32 = arrivals
            .values()
            .fold(0u32, |acc, &ships| acc.saturating_add(ships));
        return CombatResult {
            owner: garrison_owner,
            ships: garrison_ships.saturating_add(reinforcements),
        };
    }

    let mut strength: BTreeMap<PlayerId, u64> = BTreeMap::new();
    *strength.entry(garrison_owner).or_default() += u64::from(garrison_ships);
    for (&owner, &ships) in arrivals {
        *strength.entry(owner).or_default() += u64::from(ships);
    }

    // Sort by strength descending; ties broken by owner for a stable order.
    let mut sorted: Vec<(PlayerId, u64)> = strength.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let (top_owner, top_strength) = sorted[0];
    let runner_up = sorted.get(1).map_or(0, |&(_, s)| s);
    if top_strength == runner_up {
        return neutral();
    }

    let others: u64 = sorted[1..].iter().map(|&(_, s)| s).sum();
    if top_strength <= others {
        return neutral();
    }

    CombatResult {
        owner: top_owner,
        ships: u32::try_from(top_strength - others).unwrap_or(u32::MAX),
    }
}

const fn neutral() -> CombatResult {
    CombatResult {
        owner: NEUTRAL,
        ships: 0,
    }
}

/// Kani formal verification proofs.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// The survivor never ends up with more ships than were present.
    #[kani::proof]
    fn prove_two_party_survivor_bounded() {
        let defender: u32 = kani::any();
        let attacker: u32 = kani::any();

        let mut arrivals = Arrivals::new();
        arrivals.insert(2, attacker);
        let result = resolve_combat(1, defender, &arrivals);

        assert!(u64::from(result.ships) <= u64::from(defender) + u64::from(attacker));
        if result.owner == NEUTRAL {
            assert!(result.ships == 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrivals(entries: &[(PlayerId, u32)]) -> Arrivals {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_no_arrivals_keeps_garrison() {
        let result = resolve_combat(1, 12, &Arrivals::new());
        assert_eq!(result, CombatResult { owner: 1, ships: 12 });
    }

    #[test]
    fn test_reinforcement_adds_ships() {
        let result = resolve_combat(1, 12, &arrivals(&[(1, 8)]));
        assert_eq!(result, CombatResult { owner: 1, ships: 20 });
    }

    #[test]
    fn test_attacker_wins() {
        let result = resolve_combat(2, 10, &arrivals(&[(1, 15)]));
        assert_eq!(result, CombatResult { owner: 1, ships: 5 });
    }

    #[test]
    fn test_attacker_wins_repeatably() {
        for _ in 0..100 {
            assert_eq!(
                resolve_combat(2, 10, &arrivals(&[(1, 15)])),
                CombatResult { owner: 1, ships: 5 }
            );
        }
    }

    #[test]
    fn test_defender_holds() {
        let result = resolve_combat(2, 20, &arrivals(&[(1, 15)]));
        assert_eq!(result, CombatResult { owner: 2, ships: 5 });
    }

    #[test]
    fn test_neutral_garrison_fights() {
        let result = resolve_combat(NEUTRAL, 10, &arrivals(&[(1, 15)]));
        assert_eq!(result, CombatResult { owner: 1, ships: 5 });

        let result = resolve_combat(NEUTRAL, 10, &arrivals(&[(1, 4)]));
        assert_eq!(result, CombatResult { owner: NEUTRAL, ships: 6 });
    }

    #[test]
    fn test_two_party_tie_goes_neutral() {
        let result = resolve_combat(2, 10, &arrivals(&[(1, 10)]));
        assert_eq!(result, neutral());
    }

    #[test]
    fn test_three_way_tie_goes_neutral() {
        // Two attackers of 10 each against an empty neutral planet.
        let result = resolve_combat(NEUTRAL, 0, &arrivals(&[(1, 10), (2, 10)]));
        assert_eq!(result, neutral());
    }

    #[test]
    fn test_tie_with_incumbent_goes_neutral() {
        let result = resolve_combat(1, 10, &arrivals(&[(2, 10), (3, 4)]));
        assert_eq!(result, neutral());
    }

    #[test]
    fn test_survivor_pays_for_all_opponents() {
        // 20 against 5 + 5: the survivor loses the combined opposition.
        let result = resolve_combat(1, 20, &arrivals(&[(2, 5), (3, 5)]));
        assert_eq!(result, CombatResult { owner: 1, ships: 10 });
    }

    #[test]
    fn test_outnumbered_by_coalition_goes_neutral() {
        let result = resolve_combat(NEUTRAL, 0, &arrivals(&[(1, 20), (2, 10), (3, 15)]));
        assert_eq!(result, neutral());
    }

    #[test]
    fn test_garrison_and_reinforcement_sum_for_owner() {
        // Owner 1 has 6 at home plus 6 arriving; owner 2 brings 10.
        let result = resolve_combat(1, 6, &arrivals(&[(1, 6), (2, 10)]));
        assert_eq!(result, CombatResult { owner: 1, ships: 2 });
    }

    #[test]
    fn test_large_values_saturate() {
        let result = resolve_combat(1, u32::MAX, &arrivals(&[(1, u32::MAX)]));
        assert_eq!(result, CombatResult { owner: 1, ships: u32::MAX });
    }
}
