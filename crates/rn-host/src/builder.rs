//! Programmatic construction of [`ProjectSnapshot`]s.
//!
//! ```
//! use rn_host::SnapshotBuilder;
//!
//! let mut b = SnapshotBuilder::new("Podcast");
//! b.timeline("Main", 25.0);
//! let dialogue = b.audio_track("Dialogue");
//! let intro = b.media("/audio/take 1.wav");
//! b.clip(dialogue, intro, 0, 250);
//! let snapshot = b.build();
//! assert_eq!(snapshot.media_pool.len(), 1);
//! ```

use std::path::PathBuf;

use rn_core::{ClipId, MediaId, TrackKind};

use crate::snapshot::{ClipRecord, MediaRecord, ProjectSnapshot, TimelineRecord, TrackRecord};

/// Builds a snapshot one timeline, track, media entry and clip at a time.
///
/// Tracks and clips are added to the most recently added timeline. Track
/// handles returned by [`audio_track`](Self::audio_track) are the 1-based
/// indices a host uses for that track.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: ProjectSnapshot,
}

impl SnapshotBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            snapshot: ProjectSnapshot {
                name: project.to_string(),
                ..ProjectSnapshot::default()
            },
        }
    }

    /// Start a new timeline; later tracks and clips land on it.
    pub fn timeline(&mut self, name: &str, frame_rate: f64) -> &mut Self {
        self.snapshot.timelines.push(TimelineRecord {
            name: name.to_string(),
            frame_rate,
            tracks: Vec::new(),
        });
        self
    }

    /// Add an audio track and return its 1-based audio track index.
    pub fn audio_track(&mut self, name: &str) -> usize {
        self.track(TrackKind::Audio, Some(name))
    }

    /// Add a track of any kind and return its 1-based index within the kind.
    pub fn track(&mut self, kind: TrackKind, name: Option<&str>) -> usize {
        let timeline = self.current_timeline();
        timeline.tracks.push(TrackRecord {
            kind,
            name: name.map(str::to_string),
            clips: Vec::new(),
        });
        timeline.tracks.iter().filter(|t| t.kind == kind).count()
    }

    /// Add a media pool entry for the file at `path`.
    pub fn media(&mut self, path: impl Into<PathBuf>) -> MediaId {
        let path = path.into();
        let clip_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.push_media(clip_name, Some(path))
    }

    /// Add a media pool entry that has no file behind it.
    pub fn media_without_file(&mut self, clip_name: &str) -> MediaId {
        self.push_media(clip_name.to_string(), None)
    }

    /// Place `media` on an audio track, named after the media's file stem.
    pub fn clip(&mut self, track: usize, media: MediaId, start: i64, duration: i64) -> ClipId {
        let name = self
            .snapshot
            .media_pool
            .iter()
            .find(|m| m.id == media)
            .map(|m| match m.clip_name.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                _ => m.clip_name.clone(),
            })
            .unwrap_or_default();
        self.clip_named(track, Some(media), &name, start, duration)
    }

    /// Place a clip with an explicit name and optional media on an audio track.
    ///
    /// # Panics
    ///
    /// If `track` is not an audio track index returned by this builder.
    pub fn clip_named(
        &mut self,
        track: usize,
        media: Option<MediaId>,
        name: &str,
        start: i64,
        duration: i64,
    ) -> ClipId {
        let id = ClipId::new();
        let timeline = self.current_timeline();
        let record = ClipRecord {
            id,
            name: name.to_string(),
            start,
            duration,
            media,
        };
        match timeline
            .tracks
            .iter_mut()
            .filter(|t| t.kind == TrackKind::Audio)
            .nth(track.saturating_sub(1))
        {
            Some(t) => t.clips.push(record),
            None => panic!("audio track {track} has not been added"),
        }
        id
    }

    pub fn build(&self) -> ProjectSnapshot {
        self.snapshot.clone()
    }

    fn push_media(&mut self, clip_name: String, file_path: Option<PathBuf>) -> MediaId {
        let id = MediaId::new();
        self.snapshot.media_pool.push(MediaRecord {
            id,
            clip_name,
            file_path,
        });
        id
    }

    fn current_timeline(&mut self) -> &mut TimelineRecord {
        if self.snapshot.timelines.is_empty() {
            self.timeline("Timeline 1", 24.0);
        }
        let last = self.snapshot.timelines.len() - 1;
        &mut self.snapshot.timelines[last]
    }
}
