//! Interactions with the external collaborators: ffprobe, mpv,
//! SvtAv1EncApp and ffmpeg.
//!
//! Every stage is a blocking subprocess built from discrete arguments;
//! user-controlled values (paths, times, bitrates) are never interpolated
//! into a shell string.

use std::io;
use std::process::{Command, Stdio};

use crate::error::{CoreError, CoreResult};

pub mod ffmpeg;
pub mod ffprobe_executor;
pub mod mpv;
pub mod svtav1;

pub use ffprobe_executor::{probe_file, MediaProbe, VideoParams};

/// The mpv binary name.
pub const MPV_BIN: &str = "mpv";
/// The ffmpeg binary name.
pub const FFMPEG_BIN: &str = "ffmpeg";
/// The ffprobe binary name.
pub const FFPROBE_BIN: &str = "ffprobe";
/// The SVT-AV1 encoder binary name.
pub const SVTAV1_BIN: &str = "SvtAv1EncApp";

/// Checks that a required external command is available and executable.
pub(crate) fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check for '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Verifies all four collaborators are invocable before the pipeline runs.
pub fn check_dependencies() -> CoreResult<()> {
    check_dependency(MPV_BIN, "--version")?;
    check_dependency(FFMPEG_BIN, "-version")?;
    check_dependency(FFPROBE_BIN, "-version")?;
    check_dependency(SVTAV1_BIN, "--version")?;
    Ok(())
}

/// Version strings of the external tools, recorded in output metadata.
#[derive(Debug, Clone)]
pub struct ToolVersions {
    pub mpv: String,
    pub ffmpeg: String,
    pub svtav1: String,
}

impl ToolVersions {
    /// Best-effort capture; an unparseable version banner becomes "unknown".
    pub fn capture() -> Self {
        ToolVersions {
            mpv: version_token(MPV_BIN, "--version", 1),
            ffmpeg: version_token(FFMPEG_BIN, "-version", 2),
            svtav1: version_token(SVTAV1_BIN, "--version", 1),
        }
    }
}

/// Runs `cmd arg` and picks the whitespace-separated token at `index` from
/// the first line of output (e.g. "mpv 0.38.0 ..." -> "0.38.0").
fn version_token(cmd: &str, arg: &str, index: usize) -> String {
    let output = Command::new(cmd)
        .arg(arg)
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(output) => String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .nth(index)
            .unwrap_or("unknown")
            .to_string(),
        Err(e) => {
            log::debug!("Could not read {cmd} version: {e}");
            "unknown".to_string()
        }
    }
}
