//! Clip time range handling.
//!
//! Times are accepted either as bare seconds ("80.69") or as colon-separated
//! timestamps ("01:20.69", "1:02:03.5"). The raw spelling is kept alongside
//! the parsed value: mpv takes it verbatim, and the output file name embeds
//! it with colons swapped for dots.

use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A single point in time within the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePos {
    /// Seconds from the start of the file.
    pub seconds: f64,
    /// The spelling the user gave, e.g. "01:20.69".
    pub raw: String,
}

impl FromStr for TimePos {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let seconds = parse_seconds(s)
            .ok_or_else(|| CoreError::InvalidParameter(format!("invalid time '{s}'")))?;
        Ok(TimePos {
            seconds,
            raw: s.to_string(),
        })
    }
}

fn parse_seconds(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let mut seconds = 0.0;
    for (i, part) in parts.iter().enumerate() {
        // Only the last component may be fractional; minutes and hours
        // must be whole numbers.
        let value = if i == parts.len() - 1 {
            part.parse::<f64>().ok()?
        } else {
            f64::from(part.parse::<u32>().ok()?)
        };
        if value < 0.0 {
            return None;
        }
        seconds = seconds * 60.0 + value;
    }
    Some(seconds)
}

/// The resolved trim range for one invocation.
#[derive(Debug, Clone, Default)]
pub struct TimeRange {
    pub start: Option<TimePos>,
    pub end: Option<TimePos>,
}

impl TimeRange {
    pub fn new(start: Option<TimePos>, end: Option<TimePos>) -> CoreResult<Self> {
        if let (Some(s), Some(e)) = (&start, &end) {
            if s.seconds > e.seconds {
                return Err(CoreError::InvalidParameter(format!(
                    "start ({}) must not be after end ({})",
                    s.raw, e.raw
                )));
            }
        }
        Ok(TimeRange { start, end })
    }

    /// Start offset in seconds (0 when unset).
    pub fn start_seconds(&self) -> f64 {
        self.start.as_ref().map_or(0.0, |t| t.seconds)
    }

    /// Clip duration in seconds, or None for "to end of file".
    pub fn duration(&self) -> Option<f64> {
        self.end
            .as_ref()
            .map(|e| e.seconds - self.start_seconds())
    }

    pub fn is_whole_file(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// The "start-end" token embedded in output names and metadata, with
    /// colons swapped for dots ("01.20.69-01.30.96"). "complete" when the
    /// whole file is clipped; an omitted start becomes "0.0".
    pub fn range_token(&self) -> String {
        if self.is_whole_file() {
            return "complete".to_string();
        }
        let mut token = match &self.start {
            Some(s) => s.raw.replace(':', "."),
            None => "0.0".to_string(),
        };
        if let Some(e) = &self.end {
            token.push('-');
            token.push_str(&e.raw.replace(':', "."));
        }
        token
    }
}
