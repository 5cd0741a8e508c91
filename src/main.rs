//! Planet Wars CLI - Command-line interface for running matches and tournaments.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Planet Wars - A deterministic simulation and tournament engine
#[derive(Parser, Debug)]
#[command(name = "planetwars")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match between two built-in bots
    Run {
        /// Map file
        #[arg(required = true)]
        map: PathBuf,

        /// Built-in bot names, one per seat
        #[arg(required = true, num_args = 2)]
        bots: Vec<String>,

        /// Maximum turns (default: 200)
        #[arg(short = 't', long)]
        turns: Option<u32>,

        /// Per-turn budget in milliseconds (0 = no limit)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the replay as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Save the viewer playback string
        #[arg(long)]
        playback: Option<PathBuf>,

        /// Pipe the playback string into a viewer program
        #[arg(long)]
        viewer: Option<String>,
    },

    /// Play every scheduled match and aggregate the results
    Tournament {
        /// Map files
        #[arg(short, long = "map", required = true)]
        maps: Vec<PathBuf>,

        /// Built-in bot names
        #[arg(short, long = "bot", required = true)]
        bots: Vec<String>,

        /// Play only the matches of this bot
        #[arg(long)]
        focal: Option<String>,

        /// Tournament config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum turns per match
        #[arg(short = 't', long)]
        turns: Option<u32>,

        /// Per-turn budget in milliseconds (0 = no limit)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check map files
    Validate {
        /// Map files to check
        #[arg(required = true)]
        maps: Vec<PathBuf>,
    },

    /// List the built-in bots
    Bots,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            map,
            bots,
            turns,
            timeout_ms,
            format,
            save,
            playback,
            viewer,
        } => cli::run::execute(&cli::run::RunArgs {
            map,
            bots,
            turns,
            timeout_ms,
            format,
            save,
            playback,
            viewer,
        }),

        Commands::Tournament {
            maps,
            bots,
            focal,
            config,
            threads,
            turns,
            timeout_ms,
            format,
            out,
            progress,
        } => cli::tournament::execute(&cli::tournament::TournamentArgs {
            maps,
            bots,
            focal,
            config,
            threads,
            turns,
            timeout_ms,
            format,
            out,
            progress,
        }),

        Commands::Validate { maps } => cli::validate::execute(&maps),

        Commands::Bots => {
            cli::bots::execute();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
