//! Clip configuration.
//!
//! One immutable `ClipConfig` is built per invocation from the parsed CLI
//! arguments and validated before any external process is launched. The
//! encode defaults live here as named constants.

use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::time::TimeRange;
use crate::tracks::TrackSelector;

/// Default Opus audio bitrate.
pub const DEFAULT_AUDIO_BITRATE: &str = "256k";

/// Default SVT-AV1 CRF. Range 0-63, lower is higher quality.
pub const DEFAULT_CRF: u8 = 30;

/// Default SVT-AV1 preset. Range 0-8, lower is slower/better.
pub const DEFAULT_PRESET: u8 = 3;

/// Default log2 of SVT-AV1 tile rows. Range 0-6.
pub const DEFAULT_TILE_ROWS: u8 = 2;

/// Default log2 of SVT-AV1 tile columns. Range 0-4.
pub const DEFAULT_TILE_COLUMNS: u8 = 2;

/// Default SVT-AV1 film grain synthesis level. Range 0-50.
pub const DEFAULT_FILM_GRAIN: u8 = 8;

/// Default SVT-AV1 scene change detection flag. 0 or 1.
pub const DEFAULT_SCD: u8 = 0;

/// libopus bitrate bounds in bits per second.
const OPUS_BITRATE_MIN: u64 = 500;
const OPUS_BITRATE_MAX: u64 = 512_000;

/// Encoder and audio settings for the encode stage.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// Opus bitrate, e.g. "256k" or "192000".
    pub audio_bitrate: String,
    pub crf: u8,
    pub preset: u8,
    pub tile_rows: u8,
    pub tile_columns: u8,
    pub film_grain: u8,
    pub scd: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        EncodeSettings {
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET,
            tile_rows: DEFAULT_TILE_ROWS,
            tile_columns: DEFAULT_TILE_COLUMNS,
            film_grain: DEFAULT_FILM_GRAIN,
            scd: DEFAULT_SCD,
        }
    }
}

impl EncodeSettings {
    fn validate(&self) -> CoreResult<()> {
        check_range("crf", self.crf, 63)?;
        check_range("preset", self.preset, 8)?;
        check_range("tile-rows", self.tile_rows, 6)?;
        check_range("tile-columns", self.tile_columns, 4)?;
        check_range("film-grain", self.film_grain, 50)?;
        check_range("scd", self.scd, 1)?;
        parse_opus_bitrate(&self.audio_bitrate)?;
        Ok(())
    }
}

fn check_range(name: &str, value: u8, max: u8) -> CoreResult<()> {
    if value > max {
        return Err(CoreError::InvalidParameter(format!(
            "{name} must be in 0-{max}, got {value}"
        )));
    }
    Ok(())
}

/// Parses an Opus bitrate string ("256k" or plain bps) and checks it
/// against the libopus limits (500 to 512000 bps).
pub fn parse_opus_bitrate(value: &str) -> CoreResult<u64> {
    let bps_str = match value.strip_suffix('k') {
        Some(prefix) => format!("{prefix}000"),
        None => value.to_string(),
    };
    let bps = bps_str.parse::<u64>().map_err(|_| {
        CoreError::InvalidParameter(format!("invalid audio bitrate '{value}'"))
    })?;
    if !(OPUS_BITRATE_MIN..=OPUS_BITRATE_MAX).contains(&bps) {
        return Err(CoreError::InvalidParameter(format!(
            "libopus: bitrate {bps} bps is unsupported, choose a value \
             between {OPUS_BITRATE_MIN} and {OPUS_BITRATE_MAX}"
        )));
    }
    Ok(bps)
}

/// The validated options for one clip invocation.
#[derive(Debug, Clone)]
pub struct ClipConfig {
    pub input: PathBuf,
    pub range: TimeRange,
    pub video_track: TrackSelector,
    pub audio_track: TrackSelector,
    pub subtitle_track: TrackSelector,
    /// Scale target width in pixels; mutually exclusive with `scale_height`.
    pub scale_width: Option<u32>,
    /// Scale target height in pixels; mutually exclusive with `scale_width`.
    pub scale_height: Option<u32>,
    pub encode: EncodeSettings,
}

impl ClipConfig {
    pub fn new(input: PathBuf) -> Self {
        ClipConfig {
            input,
            range: TimeRange::default(),
            video_track: TrackSelector::Auto,
            audio_track: TrackSelector::Auto,
            subtitle_track: TrackSelector::Auto,
            scale_width: None,
            scale_height: None,
            encode: EncodeSettings::default(),
        }
    }

    /// Fail-fast validation; nothing is spawned until this passes.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.input.is_file() {
            return Err(CoreError::InvalidParameter(format!(
                "'{}' is not a file",
                self.input.display()
            )));
        }
        if self.scale_width.is_some() && self.scale_height.is_some() {
            return Err(CoreError::InvalidParameter(
                "width and height are mutually exclusive, set at most one".to_string(),
            ));
        }
        for (name, value) in [("width", self.scale_width), ("height", self.scale_height)] {
            if value == Some(0) {
                return Err(CoreError::InvalidParameter(format!(
                    "{name} must be a positive integer"
                )));
            }
        }
        self.encode.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(encode: EncodeSettings) -> ClipConfig {
        // Validation of the input path is exercised separately; point at a
        // file that always exists.
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let mut config = ClipConfig::new(manifest);
        config.encode = encode;
        config
    }

    #[test]
    fn default_settings_validate() {
        assert!(config_with(EncodeSettings::default()).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        for (field, value) in [
            ("crf", 64u8),
            ("preset", 9),
            ("tile_rows", 7),
            ("tile_columns", 5),
            ("film_grain", 51),
            ("scd", 2),
        ] {
            let mut encode = EncodeSettings::default();
            match field {
                "crf" => encode.crf = value,
                "preset" => encode.preset = value,
                "tile_rows" => encode.tile_rows = value,
                "tile_columns" => encode.tile_columns = value,
                "film_grain" => encode.film_grain = value,
                "scd" => encode.scd = value,
                _ => unreachable!(),
            }
            let err = config_with(encode).validate().unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidParameter(_)),
                "{field}={value} should be rejected"
            );
        }
    }

    #[test]
    fn opus_bitrate_bounds() {
        assert_eq!(parse_opus_bitrate("256k").unwrap(), 256_000);
        assert_eq!(parse_opus_bitrate("512k").unwrap(), 512_000);
        assert_eq!(parse_opus_bitrate("500").unwrap(), 500);
        assert!(parse_opus_bitrate("499").is_err());
        assert!(parse_opus_bitrate("513k").is_err());
        assert!(parse_opus_bitrate("fast").is_err());
    }

    #[test]
    fn rejects_width_and_height_together() {
        let mut config = config_with(EncodeSettings::default());
        config.scale_width = Some(1280);
        config.scale_height = Some(720);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_missing_input() {
        let config = ClipConfig::new(PathBuf::from("surely/not/here.mkv"));
        assert!(config.validate().is_err());
    }
}
