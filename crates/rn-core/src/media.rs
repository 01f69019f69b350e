//! Timeline value types: track kinds and frame-based timecodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// TrackKind
// ---------------------------------------------------------------------------

/// Kind of timeline track as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(format!("unknown track kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Timecode
// ---------------------------------------------------------------------------

/// A non-drop-frame `HH:MM:SS:FF` timecode derived from a frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u32,
}

impl Timecode {
    /// Convert a frame count at `frame_rate` into a timecode.
    ///
    /// The frame field counts against the rounded integer rate while the
    /// clock fields use the exact rate, so fractional rates such as 23.976
    /// drift the same way the host displays them. Negative frame counts and
    /// non-positive rates yield `00:00:00:00`.
    pub fn from_frames(frames: i64, frame_rate: f64) -> Self {
        if frame_rate <= 0.0 || !frame_rate.is_finite() || frames <= 0 {
            return Self::default();
        }

        let fps_int = (frame_rate.round() as i64).max(1);
        let total_seconds = frames as f64 / frame_rate;

        Self {
            hours: (total_seconds / 3600.0) as u64,
            minutes: ((total_seconds / 60.0) % 60.0) as u8,
            seconds: (total_seconds % 60.0) as u8,
            frames: (frames % fps_int) as u32,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}
