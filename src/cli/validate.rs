//! Map validation command implementation.

use super::CliError;
use planetwars::game::{Map, NEUTRAL};
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if any map fails to load.
pub(crate) fn execute(maps: &[PathBuf]) -> Result<(), CliError> {
    let mut failed = 0usize;

    for path in maps {
        match Map::load(path) {
            Ok(map) => {
                let neutral = map.planets().iter().filter(|p| p.owner == NEUTRAL).count();
                print_check(&path.display().to_string(), true);
                println!(
                    "      {} planets ({} neutral), {} players",
                    map.planets().len(),
                    neutral,
                    map.player_count()
                );
            }
            Err(e) => {
                print_check(&path.display().to_string(), false);
                println!("      {e}");
                failed += 1;
            }
        }
    }

    println!();
    if failed > 0 {
        return Err(CliError::new(format!("{failed} of {} maps invalid", maps.len())));
    }
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
