//! Output formatting utilities for CLI.

use std::fmt::Write as _;

use planetwars::runner::{MatchResult, Outcome};
use planetwars::tournament::TournamentResults;

/// Format a match result as human-readable text.
pub(super) fn format_match_text(result: &MatchResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Match Result (map: {})", result.map);
    match result.outcome {
        Outcome::Winner { player, victory } => {
            let name = result.player_name(player).unwrap_or("Unknown");
            let _ = writeln!(output, "  Winner: Player {player} ({name}) by {victory}");
        }
        Outcome::Draw => output.push_str("  Winner: Draw\n"),
    }
    let _ = writeln!(output, "  Turns: {}\n", result.turns_played);

    for tally in &result.tallies {
        let _ = write!(
            output,
            "  Player {} ({}): {} planets, {} ships ({} in flight), growth {}",
            tally.player, tally.name, tally.planets, tally.ships, tally.fleet_ships, tally.growth
        );
        if tally.rejected_orders > 0 {
            let _ = write!(output, " [{} orders rejected]", tally.rejected_orders);
        }
        output.push('\n');
    }

    if !result.faults.is_empty() {
        output.push_str("\nFaults:\n");
        for fault in &result.faults {
            let name = result.player_name(fault.player).unwrap_or("Unknown");
            let _ = writeln!(
                output,
                "  Turn {}: Player {} ({}) {}",
                fault.turn, fault.player, name, fault.fault
            );
        }
    }

    output
}

/// Format tournament standings as human-readable text.
pub(super) fn format_tournament_text(results: &TournamentResults) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Tournament Results ({} matches)", results.records.len());
    output.push_str("========================================\n\n");

    let _ = writeln!(
        output,
        "  {:<24} {:>6} {:>5} {:>5} {:>5} {:>8} {:>7}",
        "Player", "Played", "Won", "Drawn", "Lost", "Forfeits", "Points"
    );
    for standing in results.standings() {
        let t = &standing.tally;
        let _ = writeln!(
            output,
            "  {:<24} {:>6} {:>5} {:>5} {:>5} {:>8} {:>7.1}",
            standing.player, t.played, t.wins, t.draws, t.losses, t.forfeits, standing.points
        );
    }

    if !results.skipped_maps.is_empty() {
        output.push_str("\nSkipped maps:\n");
        for skipped in &results.skipped_maps {
            let _ = writeln!(output, "  {}: {}", skipped.map, skipped.error);
        }
    }

    if results.cancelled {
        let _ = writeln!(output, "\nCancelled: {} matches not played", results.unplayed);
    }

    output
}
