//! Track selection.
//!
//! Selectors follow mpv's convention: `auto` (default), `no`, or a 1-based
//! per-kind track id. `auto` resolves against the probed stream list to the
//! first track of that kind, or to nothing when the source has none.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Stream kinds the pipeline cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl TrackKind {
    /// The `codec_type` value ffprobe reports for this kind.
    pub fn codec_type(self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_type())
    }
}

/// A user-supplied track selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackSelector {
    #[default]
    Auto,
    Disabled,
    /// 1-based track number within its kind.
    Id(u32),
}

impl FromStr for TrackSelector {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "auto" => Ok(TrackSelector::Auto),
            "no" => Ok(TrackSelector::Disabled),
            _ => s.parse::<u32>().map(TrackSelector::Id).map_err(|_| {
                CoreError::InvalidParameter(format!(
                    "track selector must be 'auto', 'no' or a track id, got '{s}'"
                ))
            }),
        }
    }
}

impl TrackSelector {
    /// Resolves this selector against the probed track count for `kind`.
    ///
    /// Returns the 1-based track number to use, or None when the stream is
    /// to be omitted. An explicit id outside `1..=available` is an
    /// `InvalidTrack` error; `auto` picks track 1 when any track exists.
    pub fn resolve(self, kind: TrackKind, available: usize) -> CoreResult<Option<u32>> {
        match self {
            TrackSelector::Disabled => Ok(None),
            TrackSelector::Auto => Ok(if available > 0 { Some(1) } else { None }),
            TrackSelector::Id(id) => {
                if id >= 1 && (id as usize) <= available {
                    Ok(Some(id))
                } else {
                    Err(CoreError::InvalidTrack {
                        kind,
                        id,
                        available,
                    })
                }
            }
        }
    }
}

/// Concrete track numbers after probe-backed resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTracks {
    pub video: Option<u32>,
    pub audio: Option<u32>,
    pub subtitle: Option<u32>,
}

impl ResolvedTracks {
    /// Subtitle burning happens exactly when a subtitle track resolved.
    pub fn wants_subtitle_burn(&self) -> bool {
        self.subtitle.is_some()
    }
}
