//! CSV and JSON export of tournament results.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::runner::Outcome;
use crate::tournament::{MatchRecord, Standing, TournamentError, TournamentResults};

/// Column header of the CSV export.
pub const CSV_HEADER: &str = "fixture,map,player_1,player_2,winner,outcome,victory,turns,\
planets_1,ships_1,planets_2,ships_2,faults";

/// Quote a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(out: &mut String, record: &MatchRecord) {
    let result = &record.result;
    let name = |seat: usize| result.players.get(seat).map_or("", String::as_str);
    let (outcome, victory) = match result.outcome {
        Outcome::Winner { victory, .. } => ("win", victory.to_string()),
        Outcome::Draw => ("draw", String::new()),
    };
    let tally = |seat: u8| {
        result
            .tally(seat)
            .map_or((0, 0), |t| (t.planets, t.ships))
    };
    let (planets_1, ships_1) = tally(1);
    let (planets_2, ships_2) = tally(2);
    let faults: Vec<String> = result
        .faults
        .iter()
        .map(|f| format!("p{}@{}: {}", f.player, f.turn, f.fault))
        .collect();

    let _ = writeln!(
        out,
        "{},{},{},{},{},{},{},{},{},{},{},{},{}",
        record.fixture,
        csv_field(&result.map),
        csv_field(name(0)),
        csv_field(name(1)),
        csv_field(result.winner_name().unwrap_or("")),
        outcome,
        victory,
        result.turns_played,
        planets_1,
        ships_1,
        planets_2,
        ships_2,
        csv_field(&faults.join("; ")),
    );
}

/// Map that was left out, as exported.
#[derive(Debug, Serialize)]
struct SkippedExport<'a> {
    map: &'a str,
    reason: String,
}

/// Full JSON document.
#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    cancelled: bool,
    unplayed: usize,
    standings: Vec<Standing>,
    skipped_maps: Vec<SkippedExport<'a>>,
    matches: &'a [MatchRecord],
}

impl TournamentResults {
    /// One CSV row per played match, in fixture order.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');
        for record in &self.records {
            csv_row(&mut out, record);
        }
        out
    }

    /// Full results, standings and skipped maps as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, TournamentError> {
        let export = JsonExport {
            cancelled: self.cancelled,
            unplayed: self.unplayed,
            standings: self.standings(),
            skipped_maps: self
                .skipped_maps
                .iter()
                .map(|s| SkippedExport {
                    map: &s.map,
                    reason: s.error.to_string(),
                })
                .collect(),
            matches: &self.records,
        };
        serde_json::to_string_pretty(&export).map_err(|e| TournamentError::Export(e.to_string()))
    }

    /// Write the CSV export to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_csv(&self, path: &Path) -> Result<(), TournamentError> {
        fs::write(path, self.to_csv()).map_err(|e| TournamentError::Export(format!("{}: {e}", path.display())))
    }

    /// Write the JSON export to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be
    /// written.
    pub fn write_json(&self, path: &Path) -> Result<(), TournamentError> {
        let json = self.to_json()?;
        fs::write(path, json + "\n").map_err(|e| TournamentError::Export(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_header_columns() {
        assert_eq!(CSV_HEADER.split(',').count(), 13);
    }
}
