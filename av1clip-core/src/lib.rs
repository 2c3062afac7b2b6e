//! Core library for av1clip.
//!
//! av1clip cuts a short AV1/Opus `.webm` clip out of a longer source file
//! by orchestrating external tools: ffprobe for stream inventory, mpv as a
//! headless transcoder when subtitles must be burned in, and SvtAv1EncApp
//! plus ffmpeg for the AV1 encode and the final mux. No media processing
//! happens in-process.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use av1clip_core::{run_clip, ClipConfig};
//! use std::path::PathBuf;
//!
//! let mut config = ClipConfig::new(PathBuf::from("coolvideo.mkv"));
//! config.range = av1clip_core::TimeRange::new(
//!     Some("01:20.69".parse().unwrap()),
//!     Some("01:30.96".parse().unwrap()),
//! ).unwrap();
//! config.validate().unwrap();
//!
//! let outcome = run_clip(&config).unwrap();
//! println!("wrote {}", outcome.output_path.display());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod pipeline;
pub mod scaling;
pub mod temp_files;
pub mod time;
pub mod tracks;

// Re-exports for public API
pub use config::{ClipConfig, EncodeSettings};
pub use error::{CoreError, CoreResult};
pub use pipeline::{run_clip, run_clip_in, ClipOutcome};
pub use temp_files::create_session_dir;
pub use time::{TimePos, TimeRange};
pub use tracks::{TrackKind, TrackSelector};
