//! The clip pipeline.
//!
//! Stages run strictly in order: validate (no subprocess), dependency
//! check, probe, optional subtitle burn, encode (decode piped into the AV1
//! encoder, then mux). Intermediate artifacts live in a per-invocation
//! session directory that is removed on every exit path.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::ClipConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg::{AudioPlan, DecodeJob, MuxTags};
use crate::external::{self, ffmpeg, mpv, probe_file, svtav1, ToolVersions};
use crate::scaling::plan_scale;
use crate::temp_files;
use crate::tracks::{ResolvedTracks, TrackKind};

/// What a successful run produced.
#[derive(Debug)]
pub struct ClipOutcome {
    pub output_path: PathBuf,
    pub burned_subtitles: bool,
}

/// Runs the whole pipeline with a self-managed session directory.
pub fn run_clip(config: &ClipConfig) -> CoreResult<ClipOutcome> {
    config.validate()?;
    let session: TempDir = temp_files::create_session_dir()?;
    run_clip_in(config, session.path())
    // session drops here, removing any artifacts
}

/// Runs the pipeline placing intermediate artifacts under `scratch_dir`.
///
/// The caller owns `scratch_dir` and its cleanup; `run_clip` wraps this
/// with a tempfile-managed directory. `config.validate()` must have been
/// called (it is idempotent, so calling it again is harmless).
pub fn run_clip_in(config: &ClipConfig, scratch_dir: &Path) -> CoreResult<ClipOutcome> {
    config.validate()?;
    external::check_dependencies()?;
    let versions = ToolVersions::capture();

    log::info!("Probing {}", config.input.display());
    let probe = probe_file(&config.input)?;
    let tracks = resolve_tracks(config, &probe)?;
    let video_track = tracks.video.ok_or_else(|| {
        CoreError::InvalidParameter(
            "the video track cannot be disabled, received vid=no".to_string(),
        )
    })?;

    let burn = tracks.wants_subtitle_burn();

    // Decide what feeds the encoder: the burned intermediate (pre-trimmed,
    // pre-scaled, Opus audio) or the original input with trim and scale
    // applied by the decode step.
    let (encode_input, encode_video_track, encode_trim) = if burn {
        log::info!("Creating intermediate clip with burned subtitles and Opus audio");
        let source_params = probe.video_params(video_track)?;
        let scale = plan_scale(
            source_params.width,
            source_params.height,
            source_params.sample_aspect_ratio,
            config.scale_width,
            config.scale_height,
        );
        let intermediate = temp_files::artifact_path(scratch_dir, "burn", "mkv");
        mpv::run_burn(mpv::build_burn_command(config, &tracks, &scale, &intermediate))?;
        (intermediate, 1, None)
    } else {
        (config.input.clone(), video_track, Some(&config.range))
    };

    // Video parameters come from whatever actually feeds the encoder.
    let (encode_params, encode_scale) = if burn {
        let intermediate_probe = probe_file(&encode_input)?;
        let params = intermediate_probe.video_params(1)?;
        // The intermediate is already at output dimensions; only residual
        // anamorphic pixels still need normalizing.
        let scale = plan_scale(
            params.width,
            params.height,
            params.sample_aspect_ratio,
            None,
            None,
        );
        (params, scale)
    } else {
        let params = probe.video_params(video_track)?;
        let scale = plan_scale(
            params.width,
            params.height,
            params.sample_aspect_ratio,
            config.scale_width,
            config.scale_height,
        );
        (params, scale)
    };

    log::info!("Encoding with SVT-AV1");
    let ivf_path = temp_files::artifact_path(scratch_dir, "video", "ivf");
    let decode_cmd = ffmpeg::build_decode_command(&DecodeJob {
        input: &encode_input,
        video_track: encode_video_track,
        trim: encode_trim,
        scale: &encode_scale,
    });
    let encode_cmd =
        svtav1::build_encode_command(&config.encode, &encode_params, &encode_scale, &ivf_path);
    let svtav1_args = svtav1::args_summary(&encode_cmd);

    let (mut decode_child, decode_stdout) = ffmpeg::spawn_decode(decode_cmd)?;
    if let Err(err) = svtav1::run_encode(encode_cmd, decode_stdout) {
        // The decoder loses its reader and exits on its own; make sure it
        // is gone before the session directory is torn down.
        let _ = decode_child.kill();
        let _ = decode_child.wait();
        return Err(err);
    }
    ffmpeg::finish_decode(decode_child)?;

    let audio_plan = tracks.audio.map(|track| {
        if burn {
            AudioPlan {
                source: &encode_input,
                track: 1,
                transcode_bitrate: None,
                trim: None,
            }
        } else {
            AudioPlan {
                source: &config.input,
                track,
                transcode_bitrate: Some(&config.encode.audio_bitrate),
                trim: Some(&config.range),
            }
        }
    });

    let input_name = config
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let range_token = config.range.range_token();
    let dest = output_path(&config.input, &config.range);

    log::info!("Muxing to {}", dest.display());
    let mux_cmd = ffmpeg::build_mux_command(
        &ivf_path,
        audio_plan.as_ref(),
        &MuxTags {
            input_name: &input_name,
            range_token: &range_token,
            svtav1_args: &svtav1_args,
            audio_bitrate: &config.encode.audio_bitrate,
            versions: &versions,
        },
        &dest,
    );
    ffmpeg::run_mux(mux_cmd)?;

    Ok(ClipOutcome {
        output_path: dest,
        burned_subtitles: burn,
    })
}

/// Resolves the three selectors against the probed stream inventory.
fn resolve_tracks(
    config: &ClipConfig,
    probe: &external::MediaProbe,
) -> CoreResult<ResolvedTracks> {
    Ok(ResolvedTracks {
        video: config
            .video_track
            .resolve(TrackKind::Video, probe.track_count(TrackKind::Video))?,
        audio: config
            .audio_track
            .resolve(TrackKind::Audio, probe.track_count(TrackKind::Audio))?,
        subtitle: config
            .subtitle_track
            .resolve(TrackKind::Subtitle, probe.track_count(TrackKind::Subtitle))?,
    })
}

/// The output lands next to the input: "<stem> AV1[ <range>].webm".
fn output_path(input: &Path, range: &crate::time::TimeRange) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    let mut name = format!("{stem} AV1");
    if !range.is_whole_file() {
        name.push(' ');
        name.push_str(&range.range_token());
    }
    name.push_str(".webm");
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::MediaProbe;
    use crate::time::TimeRange;
    use crate::tracks::TrackSelector;

    fn config() -> ClipConfig {
        ClipConfig::new(PathBuf::from("/videos/coolvideo.mkv"))
    }

    #[test]
    fn output_name_embeds_range() {
        let range = TimeRange::new(
            Some("01:20.69".parse().unwrap()),
            Some("01:30.96".parse().unwrap()),
        )
        .unwrap();
        assert_eq!(
            output_path(Path::new("/videos/coolvideo.mkv"), &range),
            Path::new("/videos/coolvideo AV1 01.20.69-01.30.96.webm")
        );
    }

    #[test]
    fn output_name_for_whole_file_has_no_range() {
        assert_eq!(
            output_path(Path::new("coolvideo.mkv"), &TimeRange::default()),
            Path::new("coolvideo AV1.webm")
        );
    }

    #[test]
    fn auto_subtitle_with_no_streams_skips_burn() {
        let probe = MediaProbe::for_tests(1, 1, 0);
        let tracks = resolve_tracks(&config(), &probe).unwrap();
        assert!(!tracks.wants_subtitle_burn());
        assert_eq!(tracks.video, Some(1));
        assert_eq!(tracks.audio, Some(1));
    }

    #[test]
    fn auto_subtitle_with_streams_burns() {
        let probe = MediaProbe::for_tests(1, 1, 2);
        let tracks = resolve_tracks(&config(), &probe).unwrap();
        assert_eq!(tracks.subtitle, Some(1));
        assert!(tracks.wants_subtitle_burn());
    }

    #[test]
    fn absent_explicit_subtitle_is_invalid_track() {
        let mut config = config();
        config.subtitle_track = TrackSelector::Id(3);
        let probe = MediaProbe::for_tests(1, 1, 1);
        let err = resolve_tracks(&config, &probe).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTrack {
                kind: TrackKind::Subtitle,
                id: 3,
                available: 1,
            }
        ));
    }
}
