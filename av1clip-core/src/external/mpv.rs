//! The subtitle-burn pre-process stage.
//!
//! mpv is run as a headless transcoder: it renders the selected subtitle
//! track into the video frames over the trim range, applies the output
//! scale, and writes a lossless-video (x264 crf=0) Matroska intermediate
//! with the audio already transcoded to Opus at the target bitrate. The
//! encode stage then consumes the intermediate from frame zero, and the
//! mux step stream-copies its audio.

use std::path::Path;
use std::process::Command;

use crate::config::ClipConfig;
use crate::error::{command_failed_error, command_start_error, CoreResult};
use crate::external::MPV_BIN;
use crate::scaling::ScalePlan;
use crate::tracks::ResolvedTracks;

/// Builds the mpv command writing the burned-subtitle intermediate.
pub fn build_burn_command(
    config: &ClipConfig,
    tracks: &ResolvedTracks,
    scale: &ScalePlan,
    output_path: &Path,
) -> Command {
    let mut cmd = Command::new(MPV_BIN);
    cmd.args([
        "--no-config",
        "--loop=no",
        "--hr-seek=yes",
        "--hr-seek-demuxer-offset=0",
        "--sub-auto=exact",
        "--sub-visibility=yes",
        "--sub-fix-timing=no",
    ]);
    cmd.arg(&config.input);
    cmd.arg("--of=matroska");
    cmd.arg(format!("--o={}", output_path.display()));

    cmd.arg(format!("--vid={}", selector_arg(tracks.video)));
    cmd.arg(format!("--aid={}", selector_arg(tracks.audio)));
    cmd.arg(format!("--sid={}", selector_arg(tracks.subtitle)));

    if scale.needs_scale {
        cmd.arg(format!("--vf=scale=w={}:h={}", scale.width, scale.height));
    }

    // Lossless x264 video so the AV1 encode starts from pristine frames;
    // Opus audio already at the final bitrate.
    cmd.args(["--ovc=libx264", "--ovcopts-add=preset=ultrafast"]);
    cmd.arg("--ovcopts-add=crf=0");
    cmd.arg("--oac=libopus");
    cmd.arg(format!("--oacopts-add=b={}", config.encode.audio_bitrate));

    if let Some(start) = &config.range.start {
        cmd.arg(format!("--start={}", start.raw));
    }
    if let Some(end) = &config.range.end {
        cmd.arg(format!("--end={}", end.raw));
    }
    cmd
}

fn selector_arg(track: Option<u32>) -> String {
    match track {
        Some(id) => id.to_string(),
        None => "no".to_string(),
    }
}

/// Runs the burn command to completion.
pub fn run_burn(mut cmd: Command) -> CoreResult<()> {
    log::debug!("Running mpv burn command: {cmd:?}");
    let status = cmd
        .status()
        .map_err(|e| command_start_error(MPV_BIN, e))?;
    if !status.success() {
        return Err(command_failed_error("pre-process", MPV_BIN, status));
    }
    Ok(())
}
