//! Hand a recording to an external viewer process.

use std::io::Write as _;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{info, warn};

use crate::replay::{Replay, ReplayError};

/// Start `program` with `args` and stream the playback string to its stdin.
///
/// Waits for the viewer to exit and returns its status.
///
/// # Errors
///
/// Returns [`ReplayError::Viewer`] if the program cannot be started, or
/// if writing to it or waiting for it fails.
pub fn launch_viewer(program: &str, args: &[String], replay: &Replay) -> Result<ExitStatus, ReplayError> {
    let viewer_error = |error| ReplayError::Viewer {
        program: program.to_string(),
        error,
    };

    info!(program, frames = replay.frame_count(), "launching viewer");
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(viewer_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        let written = stdin
            .write_all(replay.to_playback_string().as_bytes())
            .and_then(|()| stdin.write_all(b"\n"));
        if let Err(error) = written {
            // Reap the viewer before reporting the broken pipe
            drop(stdin);
            if let Err(kill) = child.kill() {
                warn!(program, error = %kill, "failed to stop viewer");
            }
            let _ = child.wait();
            return Err(viewer_error(error));
        }
    }

    child.wait().map_err(viewer_error)
}
