//! Run command implementation.

use super::output::format_match_text;
use super::{entrant, override_match, CliError, OutputFormat};
use planetwars::game::Map;
use planetwars::replay::launch_viewer;
use planetwars::runner::{run_match, run_match_recorded, MatchConfig};
use planetwars::Player;
use std::path::PathBuf;

/// Arguments of the run command.
#[derive(Debug)]
pub(crate) struct RunArgs {
    pub(crate) map: PathBuf,
    pub(crate) bots: Vec<String>,
    pub(crate) turns: Option<u32>,
    pub(crate) timeout_ms: Option<u64>,
    pub(crate) format: OutputFormat,
    pub(crate) save: Option<PathBuf>,
    pub(crate) playback: Option<PathBuf>,
    pub(crate) viewer: Option<String>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the map cannot be loaded, a bot is unknown, or the
/// match fails to run.
pub(crate) fn execute(args: &RunArgs) -> Result<(), CliError> {
    let map = Map::load(&args.map)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", args.map.display())))?;

    let players = args
        .bots
        .iter()
        .map(|name| entrant(name).map(|e| e.create()))
        .collect::<Result<Vec<Box<dyn Player>>, _>>()?;

    let mut config = MatchConfig::default();
    override_match(&mut config, args.turns, args.timeout_ms);

    let recording = args.save.is_some() || args.playback.is_some() || args.viewer.is_some();
    let result = if recording {
        let (result, replay) = run_match_recorded(&map, players, &config)?;

        if let Some(path) = &args.save {
            replay.save(path)?;
            eprintln!("Replay saved to: {}", path.display());
        }
        if let Some(path) = &args.playback {
            replay.save_playback(path)?;
            eprintln!("Playback saved to: {}", path.display());
        }
        if let Some(command) = &args.viewer {
            let mut parts = command.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| CliError::new("Empty viewer command"))?;
            let viewer_args: Vec<String> = parts.map(str::to_string).collect();
            let status = launch_viewer(program, &viewer_args, &replay)?;
            if !status.success() {
                eprintln!("Viewer exited with {status}");
            }
        }
        result
    } else {
        run_match(&map, players, &config)?
    };

    match args.format {
        OutputFormat::Text => {
            print!("{}", format_match_text(&result));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
