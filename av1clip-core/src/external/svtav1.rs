//! SvtAv1EncApp argument building and execution.
//!
//! The encoder reads yuv4mpegpipe frames from the decode step on stdin and
//! writes the IVF elementary stream to a temporary file; the mux step picks
//! that file up afterwards.

use std::path::Path;
use std::process::{ChildStdout, Command, Stdio};

use crate::config::EncodeSettings;
use crate::error::{command_failed_error, command_start_error, command_wait_error, CoreResult};
use crate::external::ffprobe_executor::VideoParams;
use crate::external::SVTAV1_BIN;
use crate::scaling::ScalePlan;

/// Builds the SvtAv1EncApp command encoding stdin to `ivf_path`.
pub fn build_encode_command(
    settings: &EncodeSettings,
    video: &VideoParams,
    scale: &ScalePlan,
    ivf_path: &Path,
) -> Command {
    let mut cmd = Command::new(SVTAV1_BIN);
    cmd.args(["--preset", &settings.preset.to_string()]);
    cmd.args(["--tile-rows", &settings.tile_rows.to_string()]);
    cmd.args(["--tile-columns", &settings.tile_columns.to_string()]);
    cmd.args(["--crf", &settings.crf.to_string()]);
    cmd.args(["--fps-num", &video.fps_num, "--fps-denom", &video.fps_denom]);
    cmd.args(["--film-grain", &settings.film_grain.to_string()]);
    cmd.args(["--scd", &settings.scd.to_string()]);
    cmd.args(["--input-depth", &video.bit_depth]);
    cmd.args(["-w", &scale.width.to_string(), "-h", &scale.height.to_string()]);
    cmd.args(["-i", "stdin"]);
    cmd.arg("-b");
    cmd.arg(ivf_path);
    cmd
}

/// The encoder arguments as recorded in the output's `SVT-AV1_ARGS`
/// metadata tag (everything up to the input/output plumbing).
pub fn args_summary(cmd: &Command) -> String {
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let cut = args.len().saturating_sub(4); // drop "-i stdin -b <path>"
    args[..cut].join(" ")
}

/// Spawns the encoder with stdin wired to the decode child's stdout and
/// waits for it to finish.
pub fn run_encode(mut cmd: Command, decode_stdout: ChildStdout) -> CoreResult<()> {
    log::debug!("Running SVT-AV1 encode command: {cmd:?}");
    let mut child = cmd
        .stdin(Stdio::from(decode_stdout))
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| command_start_error(SVTAV1_BIN, e))?;
    let status = child
        .wait()
        .map_err(|e| command_wait_error(SVTAV1_BIN, e))?;
    if !status.success() {
        return Err(command_failed_error("encode", SVTAV1_BIN, status));
    }
    Ok(())
}
