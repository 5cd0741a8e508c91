//! Tournament command implementation.

use super::output::format_tournament_text;
use super::{entrant, override_match, CliError, TournamentFormat};
use indicatif::{ProgressBar, ProgressStyle};
use planetwars::tournament::{CancelToken, PairingMode, Tournament, TournamentConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments of the tournament command.
#[derive(Debug)]
pub(crate) struct TournamentArgs {
    pub(crate) maps: Vec<PathBuf>,
    pub(crate) bots: Vec<String>,
    pub(crate) focal: Option<String>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) threads: Option<usize>,
    pub(crate) turns: Option<u32>,
    pub(crate) timeout_ms: Option<u64>,
    pub(crate) format: TournamentFormat,
    pub(crate) out: Option<PathBuf>,
    pub(crate) progress: bool,
}

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the tournament cannot be set up, a match fails, or
/// the output cannot be written.
pub(crate) fn execute(args: &TournamentArgs) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => TournamentConfig::load(path)?,
        None => TournamentConfig::default(),
    };
    override_match(&mut config.game, args.turns, args.timeout_ms);
    if let Some(player) = &args.focal {
        config.pairing = PairingMode::Focal {
            player: player.clone(),
        };
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let mut tournament = Tournament::new(config);
    for name in &args.bots {
        tournament.add_player(entrant(name)?)?;
    }
    for path in &args.maps {
        // Bad maps are skipped and reported with the results.
        let _ = tournament.add_map_file(path);
    }

    let total = tournament.fixtures()?.len();

    // Progress bar
    let pb = if args.progress {
        let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let results = tournament.run_with(&CancelToken::new(), |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    let rendered = match args.format {
        TournamentFormat::Text => {
            let mut text = format_tournament_text(&results);
            text.push_str(&format!("\nDuration: {:.2}s\n", duration.as_secs_f64()));
            text
        }
        TournamentFormat::Json => results.to_json()? + "\n",
        TournamentFormat::Csv => results.to_csv(),
    };

    match &args.out {
        Some(path) => {
            fs::write(path, rendered)
                .map_err(|e| CliError::new(format!("Failed to write {}: {e}", path.display())))?;
            eprintln!("Results written to: {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
