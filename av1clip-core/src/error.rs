use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use crate::tracks::TrackKind;

/// Custom error types for av1clip
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No {kind} track with id {id} (source has {available})")]
    InvalidTrack {
        kind: TrackKind,
        id: u32,
        available: usize,
    },

    #[error("{stage} stage failed: {tool} exited with {code}")]
    ExternalToolFailure {
        stage: &'static str,
        tool: String,
        code: String,
    },

    #[error("Required external tool '{0}' not found on PATH")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("No video stream found in input")]
    NoVideoStream,
}

/// Result type for av1clip operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a tool that failed to spawn.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Builds a `CommandWait` error for a tool whose exit could not be collected.
pub fn command_wait_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

/// Builds an `ExternalToolFailure` from a nonzero exit status.
///
/// On Unix a process killed by a signal has no exit code; the status is
/// rendered as-is in that case (e.g. "signal: 9").
pub fn command_failed_error(
    stage: &'static str,
    tool: impl Into<String>,
    status: ExitStatus,
) -> CoreError {
    let code = match status.code() {
        Some(code) => format!("code {code}"),
        None => status.to_string(),
    };
    CoreError::ExternalToolFailure {
        stage,
        tool: tool.into(),
        code,
    }
}
