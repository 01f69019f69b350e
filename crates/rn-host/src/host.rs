//! The [`MediaHost`] trait: what the engine needs from an editing application.
//!
//! Tracks are addressed the way editing hosts number them: by kind and a
//! 1-based index within that kind.

use std::path::{Path, PathBuf};

use rn_core::{ClipId, MediaId, TrackKind};

/// Failure reported by a host implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("timeline not found: {0}")]
    TimelineNotFound(String),

    #[error("{kind} track {index} not found")]
    TrackNotFound { kind: TrackKind, index: usize },

    #[error("media not found: {0}")]
    MediaNotFound(MediaId),

    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),

    /// The host refused a mutation.
    #[error("host rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

impl HostError {
    /// Convenience constructor for [`HostError::Rejected`].
    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        HostError::Rejected {
            operation,
            message: message.into(),
        }
    }
}

/// Result alias for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Timeline properties the engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineInfo {
    pub name: String,
    /// Frames per second; used only to format timecodes.
    pub frame_rate: f64,
}

/// One clip as enumerated from a track.
#[derive(Debug, Clone, PartialEq)]
pub struct HostClip {
    pub id: ClipId,
    /// Display name shown on the timeline.
    pub name: String,
    /// Timeline position of the first frame.
    pub start: i64,
    /// Length in frames.
    pub duration: i64,
    /// Backing media pool entry, `None` for clips with no media.
    pub media: Option<MediaId>,
}

/// Capability set the engine consumes from an editing host.
///
/// Read operations take `&self`; the three mutations take `&mut self`. The
/// engine never calls the host from more than one thread.
pub trait MediaHost {
    /// Look up a timeline by name.
    fn timeline(&self, name: &str) -> HostResult<TimelineInfo>;

    /// Number of tracks of `kind` on the timeline.
    fn track_count(&self, timeline: &str, kind: TrackKind) -> HostResult<usize>;

    /// User-facing track name, if the host has one.
    fn track_name(&self, timeline: &str, kind: TrackKind, index: usize)
        -> HostResult<Option<String>>;

    /// Clips on one track, in whatever order the host enumerates them.
    fn track_clips(&self, timeline: &str, kind: TrackKind, index: usize)
        -> HostResult<Vec<HostClip>>;

    /// Current file path of a media pool entry; `None` when the entry has no
    /// file (generated media, offline placeholders).
    fn media_path(&self, media: MediaId) -> HostResult<Option<PathBuf>>;

    /// Media pool clip name of an entry.
    fn media_name(&self, media: MediaId) -> HostResult<String>;

    /// Point a media pool entry at a different file.
    fn relink_media(&mut self, media: MediaId, path: &Path) -> HostResult<()>;

    /// Rename a media pool entry.
    fn set_media_name(&mut self, media: MediaId, name: &str) -> HostResult<()>;

    /// Rename a clip on the timeline.
    fn set_clip_name(&mut self, clip: ClipId, name: &str) -> HostResult<()>;
}
