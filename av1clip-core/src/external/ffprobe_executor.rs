//! FFprobe integration for media analysis.
//!
//! The probe stage asks ffprobe for machine-parseable JSON (`-print_format
//! json -show_format -show_streams`, via the ffprobe crate) and extracts
//! the stream inventory used for track resolution plus the video parameters
//! the encoder needs.

use std::path::Path;

use ffprobe::{ffprobe, FfProbeError, Stream};

use crate::error::{command_start_error, CoreError, CoreResult};
use crate::tracks::TrackKind;

/// Probed facts about one media file.
#[derive(Debug, Clone)]
pub struct MediaProbe {
    /// Container duration in seconds, when ffprobe reports one.
    pub duration: Option<f64>,
    pub video_tracks: usize,
    pub audio_tracks: usize,
    pub subtitle_tracks: usize,
    streams: Vec<Stream>,
}

impl MediaProbe {
    #[cfg(test)]
    pub(crate) fn for_tests(video: usize, audio: usize, subtitle: usize) -> Self {
        MediaProbe {
            duration: None,
            video_tracks: video,
            audio_tracks: audio,
            subtitle_tracks: subtitle,
            streams: Vec::new(),
        }
    }

    pub fn track_count(&self, kind: TrackKind) -> usize {
        match kind {
            TrackKind::Video => self.video_tracks,
            TrackKind::Audio => self.audio_tracks,
            TrackKind::Subtitle => self.subtitle_tracks,
        }
    }

    /// Video parameters of the given 1-based video track.
    pub fn video_params(&self, track: u32) -> CoreResult<VideoParams> {
        let stream = self
            .streams
            .iter()
            .filter(|s| s.codec_type.as_deref() == Some("video"))
            .nth(track.saturating_sub(1) as usize)
            .ok_or(CoreError::NoVideoStream)?;
        VideoParams::from_stream(stream)
    }
}

/// The parameters SvtAv1EncApp needs to consume a raw video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParams {
    pub width: u32,
    pub height: u32,
    /// Sample aspect ratio as a ratio of width to height; 1.0 for square
    /// pixels or when ffprobe does not report one.
    pub sample_aspect_ratio: f64,
    pub fps_num: String,
    pub fps_denom: String,
    /// Bit depth of the raw samples; ffprobe omits it for 8-bit sources.
    pub bit_depth: String,
}

impl VideoParams {
    fn from_stream(stream: &Stream) -> CoreResult<Self> {
        let width = stream
            .width
            .filter(|w| *w > 0)
            .ok_or_else(|| CoreError::FfprobeParse("video stream missing width".into()))?;
        let height = stream
            .height
            .filter(|h| *h > 0)
            .ok_or_else(|| CoreError::FfprobeParse("video stream missing height".into()))?;

        let (fps_num, fps_denom) = split_frame_rate(&stream.r_frame_rate)?;

        Ok(VideoParams {
            width: width as u32,
            height: height as u32,
            sample_aspect_ratio: parse_sample_aspect_ratio(
                stream.sample_aspect_ratio.as_deref(),
            ),
            fps_num,
            fps_denom,
            bit_depth: stream
                .bits_per_raw_sample
                .clone()
                .unwrap_or_else(|| "8".to_string()),
        })
    }
}

fn split_frame_rate(rate: &str) -> CoreResult<(String, String)> {
    let (num, denom) = rate
        .split_once('/')
        .ok_or_else(|| CoreError::FfprobeParse(format!("unexpected frame rate '{rate}'")))?;
    if num.parse::<u64>().is_err() || denom.parse::<u64>().is_err() {
        return Err(CoreError::FfprobeParse(format!(
            "unexpected frame rate '{rate}'"
        )));
    }
    Ok((num.to_string(), denom.to_string()))
}

/// "4:3" -> 1.333..; unknown or degenerate ratios count as square pixels.
fn parse_sample_aspect_ratio(sar: Option<&str>) -> f64 {
    let Some(sar) = sar else { return 1.0 };
    let Some((w, h)) = sar.split_once(':') else {
        return 1.0;
    };
    match (w.parse::<f64>(), h.parse::<f64>()) {
        (Ok(w), Ok(h)) if w > 0.0 && h > 0.0 => w / h,
        _ => 1.0,
    }
}

/// Runs ffprobe on `input_path` and gathers the stream inventory.
pub fn probe_file(input_path: &Path) -> CoreResult<MediaProbe> {
    log::debug!("Running ffprobe on: {}", input_path.display());
    let metadata = ffprobe(input_path).map_err(map_ffprobe_error)?;

    let count = |kind: &str| {
        metadata
            .streams
            .iter()
            .filter(|s| s.codec_type.as_deref() == Some(kind))
            .count()
    };

    Ok(MediaProbe {
        duration: metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok()),
        video_tracks: count("video"),
        audio_tracks: count("audio"),
        subtitle_tracks: count("subtitle"),
        streams: metadata.streams,
    })
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("ffprobe exited with {}: {}", output.status, stderr.trim());
            crate::error::command_failed_error("probe", "ffprobe", output.status)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("unknown ffprobe error: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_splits_into_fraction() {
        assert_eq!(
            split_frame_rate("24000/1001").unwrap(),
            ("24000".to_string(), "1001".to_string())
        );
        assert!(split_frame_rate("25").is_err());
        assert!(split_frame_rate("a/b").is_err());
    }

    #[test]
    fn sample_aspect_ratio_defaults_to_square() {
        assert_eq!(parse_sample_aspect_ratio(None), 1.0);
        assert_eq!(parse_sample_aspect_ratio(Some("0:1")), 1.0);
        assert_eq!(parse_sample_aspect_ratio(Some("1:1")), 1.0);
        let sar = parse_sample_aspect_ratio(Some("4:3"));
        assert!((sar - 4.0 / 3.0).abs() < 1e-9);
    }
}
