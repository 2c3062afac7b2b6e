// Defines the command-line argument surface using clap.

use std::path::PathBuf;

use av1clip_core::config::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_CRF, DEFAULT_FILM_GRAIN, DEFAULT_PRESET, DEFAULT_SCD,
    DEFAULT_TILE_COLUMNS, DEFAULT_TILE_ROWS,
};
use av1clip_core::{ClipConfig, CoreResult, TimePos, TimeRange, TrackSelector};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "av1clip",
    version,
    about = "Create AV1/Opus .webm clips using mpv, SVT-AV1 and ffmpeg",
    long_about = "Cuts a clip out of a video file and encodes it to AV1/Opus WebM. \
                  Subtitles are burned into the video when a subtitle track is \
                  selected ('auto' picks the first one the source has)."
)]
pub struct Cli {
    /// Input video file
    pub input_file: PathBuf,

    /// Start time (seconds or [HH:]MM:SS[.ms])
    #[arg(short, long)]
    pub start: Option<TimePos>,

    /// End time (seconds or [HH:]MM:SS[.ms])
    #[arg(short, long)]
    pub end: Option<TimePos>,

    // Track ids are 1-based; 'auto' takes the first track of the kind,
    // 'no' disables the stream.
    /// Video track: auto, no, or a track id
    #[arg(long, default_value = "auto", help_heading = "Track selection")]
    pub vid: TrackSelector,

    /// Audio track: auto, no, or a track id
    #[arg(long, default_value = "auto", help_heading = "Track selection")]
    pub aid: TrackSelector,

    /// Subtitle track (burned in): auto, no, or a track id
    #[arg(long, default_value = "auto", help_heading = "Track selection")]
    pub sid: TrackSelector,

    /// Scale to the specified width, preserving aspect ratio
    #[arg(short = 'W', long, visible_alias = "sw", help_heading = "Filters")]
    pub width: Option<u32>,

    /// Scale to the specified height, preserving aspect ratio
    #[arg(short = 'H', long, visible_alias = "sh", help_heading = "Filters")]
    pub height: Option<u32>,

    /// Opus audio bitrate [500-512k]
    #[arg(
        long,
        visible_alias = "ab",
        default_value = DEFAULT_AUDIO_BITRATE,
        help_heading = "Encode settings"
    )]
    pub audio_bitrate: String,

    /// SVT-AV1 crf [0-63]
    #[arg(
        long,
        default_value_t = DEFAULT_CRF,
        value_parser = clap::value_parser!(u8).range(0..=63),
        help_heading = "Encode settings"
    )]
    pub crf: u8,

    /// SVT-AV1 preset [0-8]
    #[arg(
        long,
        default_value_t = DEFAULT_PRESET,
        value_parser = clap::value_parser!(u8).range(0..=8),
        help_heading = "Encode settings"
    )]
    pub preset: u8,

    /// SVT-AV1 log2 of tile rows [0-6]
    #[arg(
        long,
        default_value_t = DEFAULT_TILE_ROWS,
        value_parser = clap::value_parser!(u8).range(0..=6),
        help_heading = "Encode settings"
    )]
    pub tile_rows: u8,

    /// SVT-AV1 log2 of tile columns [0-4]
    #[arg(
        long,
        default_value_t = DEFAULT_TILE_COLUMNS,
        value_parser = clap::value_parser!(u8).range(0..=4),
        help_heading = "Encode settings"
    )]
    pub tile_columns: u8,

    /// SVT-AV1 film grain synthesis [0-50]
    #[arg(
        short = 'g',
        long,
        default_value_t = DEFAULT_FILM_GRAIN,
        value_parser = clap::value_parser!(u8).range(0..=50),
        help_heading = "Encode settings"
    )]
    pub film_grain: u8,

    /// SVT-AV1 scene change detection [0-1]
    #[arg(
        long,
        default_value_t = DEFAULT_SCD,
        value_parser = clap::value_parser!(u8).range(0..=1),
        help_heading = "Encode settings"
    )]
    pub scd: u8,
}

impl Cli {
    /// Builds and validates the core configuration.
    pub fn into_config(self) -> CoreResult<ClipConfig> {
        let mut config = ClipConfig::new(self.input_file);
        config.range = TimeRange::new(self.start, self.end)?;
        config.video_track = self.vid;
        config.audio_track = self.aid;
        config.subtitle_track = self.sid;
        config.scale_width = self.width;
        config.scale_height = self.height;
        config.encode.audio_bitrate = self.audio_bitrate;
        config.encode.crf = self.crf;
        config.encode.preset = self.preset;
        config.encode.tile_rows = self.tile_rows;
        config.encode.tile_columns = self.tile_columns;
        config.encode.film_grain = self.film_grain;
        config.encode.scd = self.scd;
        config.validate()?;
        Ok(config)
    }
}
