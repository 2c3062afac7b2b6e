//! FFmpeg command building and execution for the encode stage.
//!
//! Two ffmpeg invocations make up the encode stage: a decode step that
//! turns the video input into a yuv4mpegpipe stream on stdout for the AV1
//! encoder, and a mux step that combines the encoded IVF elementary stream
//! with the audio into the final WebM, stamping provenance metadata.

use std::io;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;

use crate::error::{command_failed_error, command_start_error, command_wait_error, CoreResult};
use crate::external::{ToolVersions, FFMPEG_BIN};
use crate::scaling::ScalePlan;
use crate::time::TimeRange;

/// Inputs for the decode step.
#[derive(Debug)]
pub struct DecodeJob<'a> {
    pub input: &'a Path,
    /// 1-based video track number within the input.
    pub video_track: u32,
    /// Trim range; None when the input is a pre-trimmed intermediate.
    pub trim: Option<&'a TimeRange>,
    pub scale: &'a ScalePlan,
}

/// Builds the ffmpeg command decoding the video input to yuv4mpegpipe on
/// stdout.
pub fn build_decode_command(job: &DecodeJob<'_>) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-v", "error"]);

    if let Some(range) = job.trim {
        if range.start.is_some() {
            cmd.args(["-ss", &range.start_seconds().to_string()]);
        }
    }
    cmd.input(job.input.to_string_lossy().as_ref());
    if let Some(duration) = job.trim.and_then(TimeRange::duration) {
        cmd.args(["-t", &duration.to_string()]);
    }

    cmd.args(["-map", &format!("0:v:{}", job.video_track - 1)]);
    if job.scale.needs_scale {
        cmd.args([
            "-vf",
            &format!(
                "scale=w={}:h={}:flags=lanczos,setsar=1/1",
                job.scale.width, job.scale.height
            ),
        ]);
    }
    cmd.args(["-strict", "-1", "-f", "yuv4mpegpipe"]);
    cmd.output("-");
    cmd
}

/// Spawns the decode step and hands back its stdout for the encoder.
pub fn spawn_decode(mut cmd: FfmpegCommand) -> CoreResult<(FfmpegChild, std::process::ChildStdout)> {
    log::debug!("Running ffmpeg decode command: {cmd:?}");
    let mut child = cmd
        .spawn()
        .map_err(|e| command_start_error(FFMPEG_BIN, io::Error::other(e.to_string())))?;
    let stdout = child.take_stdout().ok_or_else(|| {
        command_start_error(FFMPEG_BIN, io::Error::other("stdout was not captured"))
    })?;
    Ok((child, stdout))
}

/// Waits for the decode step after the encoder has drained it.
pub fn finish_decode(mut child: FfmpegChild) -> CoreResult<()> {
    let status = child
        .wait()
        .map_err(|e| command_wait_error(FFMPEG_BIN, io::Error::other(e.to_string())))?;
    if !status.success() {
        return Err(command_failed_error("encode", FFMPEG_BIN, status));
    }
    Ok(())
}

/// How the mux step obtains its audio.
#[derive(Debug)]
pub struct AudioPlan<'a> {
    pub source: &'a Path,
    /// 1-based audio track number within the source.
    pub track: u32,
    /// Opus bitrate to transcode to; None stream-copies (the burn-path
    /// intermediate already carries Opus at the target bitrate).
    pub transcode_bitrate: Option<&'a str>,
    /// Trim to apply to the audio source; None for pre-trimmed input.
    pub trim: Option<&'a TimeRange>,
}

/// Provenance metadata stamped onto the output container.
#[derive(Debug)]
pub struct MuxTags<'a> {
    pub input_name: &'a str,
    pub range_token: &'a str,
    pub svtav1_args: &'a str,
    pub audio_bitrate: &'a str,
    pub versions: &'a ToolVersions,
}

/// Builds the ffmpeg command muxing the IVF video and the audio into the
/// final WebM.
pub fn build_mux_command(
    ivf_path: &Path,
    audio: Option<&AudioPlan<'_>>,
    tags: &MuxTags<'_>,
    dest: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-hide_banner", "-v", "error", "-y"]);
    cmd.input(ivf_path.to_string_lossy().as_ref());

    if let Some(audio) = audio {
        if let Some(range) = audio.trim {
            if range.start.is_some() {
                cmd.args(["-ss", &range.start_seconds().to_string()]);
            }
        }
        cmd.input(audio.source.to_string_lossy().as_ref());
        if let Some(duration) = audio.trim.and_then(TimeRange::duration) {
            cmd.args(["-t", &duration.to_string()]);
        }
    }

    cmd.args(["-map", "0:v:0", "-c:v", "copy"]);
    if let Some(audio) = audio {
        cmd.args(["-map", &format!("1:a:{}", audio.track - 1)]);
        match audio.transcode_bitrate {
            Some(bitrate) => {
                cmd.args(["-c:a", "libopus", "-b:a", bitrate]);
            }
            None => {
                cmd.args(["-c:a", "copy"]);
            }
        }
    }
    cmd.args(["-map_chapters", "-1"]);

    let versions = tags.versions;
    cmd.args([
        "-metadata",
        &format!("TITLE={} [{}]", tags.input_name, tags.range_token),
        "-metadata",
        &format!(
            "creation_time={}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        "-metadata",
        &format!(
            "COMMENT=Clipped with av1clip using mpv {}, SVT-AV1 {}, ffmpeg version {}",
            versions.mpv, versions.svtav1, versions.ffmpeg
        ),
        "-metadata",
        &format!("SOURCE-FILE={}", tags.input_name),
        "-metadata",
        &format!("SOURCE-RANGE={}", tags.range_token),
        "-metadata",
        &format!("DATE={}", Utc::now().format("%Y-%m-%d %H:%M:%S")),
        "-metadata:s:v:0",
        &format!("SVT-AV1_ARGS={}", tags.svtav1_args),
    ]);
    if audio.is_some() {
        cmd.args([
            "-metadata:s:a:0",
            &format!("BITRATE={} VBR", tags.audio_bitrate),
        ]);
    }

    cmd.output(dest.to_string_lossy().as_ref());
    cmd
}

/// Runs the mux step to completion.
pub fn run_mux(mut cmd: FfmpegCommand) -> CoreResult<()> {
    log::debug!("Running ffmpeg mux command: {cmd:?}");
    let mut child = cmd
        .spawn()
        .map_err(|e| command_start_error(FFMPEG_BIN, io::Error::other(e.to_string())))?;
    let status = child
        .wait()
        .map_err(|e| command_wait_error(FFMPEG_BIN, io::Error::other(e.to_string())))?;
    if !status.success() {
        return Err(command_failed_error("mux", FFMPEG_BIN, status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::plan_scale;
    use crate::time::TimeRange;

    fn test_versions() -> ToolVersions {
        ToolVersions {
            mpv: "0.38.0".to_string(),
            ffmpeg: "7.1".to_string(),
            svtav1: "v2.1.0".to_string(),
        }
    }

    fn test_range() -> TimeRange {
        TimeRange::new(Some("01:20.69".parse().unwrap()), Some("01:30.96".parse().unwrap()))
            .unwrap()
    }

    #[test]
    fn decode_command_trims_and_scales_in_direct_path() {
        let range = test_range();
        let scale = plan_scale(1920, 1080, 1.0, None, Some(480));
        let job = DecodeJob {
            input: Path::new("/videos/coolvideo.mkv"),
            video_track: 1,
            trim: Some(&range),
            scale: &scale,
        };
        let cmd_string = format!("{:?}", build_decode_command(&job));

        assert!(cmd_string.contains("-ss"));
        assert!(cmd_string.contains("80.69"));
        assert!(cmd_string.contains("10.27"));
        assert!(cmd_string.contains("0:v:0"));
        assert!(cmd_string.contains("scale=w=854:h=480:flags=lanczos,setsar=1/1"));
        assert!(cmd_string.contains("yuv4mpegpipe"));
    }

    #[test]
    fn decode_command_reads_intermediate_without_trim() {
        let scale = plan_scale(1920, 1080, 1.0, None, None);
        let job = DecodeJob {
            input: Path::new("/tmp/burn.mkv"),
            video_track: 1,
            trim: None,
            scale: &scale,
        };
        let cmd_string = format!("{:?}", build_decode_command(&job));

        assert!(!cmd_string.contains("-ss"));
        assert!(!cmd_string.contains("-vf"));
    }

    #[test]
    fn decode_command_maps_explicit_video_track() {
        let scale = plan_scale(1280, 720, 1.0, None, None);
        let job = DecodeJob {
            input: Path::new("in.mkv"),
            video_track: 2,
            trim: None,
            scale: &scale,
        };
        assert!(format!("{:?}", build_decode_command(&job)).contains("0:v:1"));
    }

    #[test]
    fn mux_command_copies_burned_audio() {
        let versions = test_versions();
        let tags = MuxTags {
            input_name: "coolvideo.mkv",
            range_token: "01.20.69-01.30.96",
            svtav1_args: "--preset 3 --crf 30",
            audio_bitrate: "256k",
            versions: &versions,
        };
        let audio = AudioPlan {
            source: Path::new("/tmp/burn.mkv"),
            track: 1,
            transcode_bitrate: None,
            trim: None,
        };
        let cmd_string = format!(
            "{:?}",
            build_mux_command(
                Path::new("/tmp/v.ivf"),
                Some(&audio),
                &tags,
                Path::new("coolvideo AV1 01.20.69-01.30.96.webm"),
            )
        );

        assert!(cmd_string.contains("1:a:0"));
        assert!(cmd_string.contains("-c:a"));
        assert!(!cmd_string.contains("libopus"));
        assert!(cmd_string.contains("TITLE=coolvideo.mkv [01.20.69-01.30.96]"));
        assert!(cmd_string.contains("SOURCE-RANGE=01.20.69-01.30.96"));
        assert!(cmd_string.contains("SVT-AV1_ARGS=--preset 3 --crf 30"));
        assert!(cmd_string.contains("map_chapters"));
    }

    #[test]
    fn mux_command_transcodes_audio_in_direct_path() {
        let versions = test_versions();
        let tags = MuxTags {
            input_name: "coolvideo.mkv",
            range_token: "0.0-10.0",
            svtav1_args: "--preset 3 --crf 30",
            audio_bitrate: "192k",
            versions: &versions,
        };
        let range = TimeRange::new(None, Some("10.0".parse().unwrap())).unwrap();
        let audio = AudioPlan {
            source: Path::new("/videos/coolvideo.mkv"),
            track: 2,
            transcode_bitrate: Some("192k"),
            trim: Some(&range),
        };
        let cmd_string = format!(
            "{:?}",
            build_mux_command(Path::new("/tmp/v.ivf"), Some(&audio), &tags, Path::new("o.webm"))
        );

        assert!(cmd_string.contains("libopus"));
        assert!(cmd_string.contains("192k"));
        assert!(cmd_string.contains("1:a:1"));
        assert!(cmd_string.contains("BITRATE=192k VBR"));
        // Start omitted: no seek on the audio input, duration still applied.
        assert!(!cmd_string.contains("-ss"));
        assert!(cmd_string.contains("\"10\""));
    }

    #[test]
    fn mux_command_omits_audio_when_disabled() {
        let versions = test_versions();
        let tags = MuxTags {
            input_name: "x.mkv",
            range_token: "complete",
            svtav1_args: "--preset 3",
            audio_bitrate: "256k",
            versions: &versions,
        };
        let cmd_string = format!(
            "{:?}",
            build_mux_command(Path::new("/tmp/v.ivf"), None, &tags, Path::new("o.webm"))
        );

        assert!(!cmd_string.contains("1:a:"));
        assert!(!cmd_string.contains("libopus"));
        assert!(!cmd_string.contains("BITRATE="));
    }
}
