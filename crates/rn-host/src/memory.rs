//! In-memory [`MediaHost`] over a [`ProjectSnapshot`].
//!
//! Besides backing [`ProjectFile`](crate::ProjectFile), this host is what the
//! engine is tested against: each mutation can be switched to fail for a
//! specific media or clip to simulate a host refusing it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rn_core::{ClipId, MediaId, TrackKind};

use crate::host::{HostClip, HostError, HostResult, MediaHost, TimelineInfo};
use crate::snapshot::{ClipRecord, MediaRecord, ProjectSnapshot, TimelineRecord, TrackRecord};

#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    snapshot: ProjectSnapshot,
    rejected_relinks: HashSet<MediaId>,
    rejected_media_names: HashSet<MediaId>,
    rejected_clip_names: HashSet<ClipId>,
}

impl MemoryHost {
    pub fn new(snapshot: ProjectSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> ProjectSnapshot {
        self.snapshot
    }

    /// Look up a media pool entry.
    pub fn media(&self, id: MediaId) -> Option<&MediaRecord> {
        self.snapshot.media_pool.iter().find(|m| m.id == id)
    }

    /// Look up a clip on any timeline.
    pub fn clip(&self, id: ClipId) -> Option<&ClipRecord> {
        self.clips().find(|c| c.id == id)
    }

    /// Make every relink of `media` fail.
    pub fn reject_relink(&mut self, media: MediaId) {
        self.rejected_relinks.insert(media);
    }

    /// Make every rename of the media pool entry `media` fail.
    pub fn reject_media_name(&mut self, media: MediaId) {
        self.rejected_media_names.insert(media);
    }

    /// Make every rename of `clip` fail.
    pub fn reject_clip_name(&mut self, clip: ClipId) {
        self.rejected_clip_names.insert(clip);
    }

    fn clips(&self) -> impl Iterator<Item = &ClipRecord> {
        self.snapshot
            .timelines
            .iter()
            .flat_map(|t| &t.tracks)
            .flat_map(|t| &t.clips)
    }

    fn find_timeline(&self, name: &str) -> HostResult<&TimelineRecord> {
        self.snapshot
            .timelines
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| HostError::TimelineNotFound(name.to_string()))
    }

    fn find_track(&self, timeline: &str, kind: TrackKind, index: usize) -> HostResult<&TrackRecord> {
        let timeline = self.find_timeline(timeline)?;
        index
            .checked_sub(1)
            .and_then(|i| timeline.tracks.iter().filter(|t| t.kind == kind).nth(i))
            .ok_or(HostError::TrackNotFound { kind, index })
    }

    fn media_mut(&mut self, id: MediaId) -> HostResult<&mut MediaRecord> {
        self.snapshot
            .media_pool
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(HostError::MediaNotFound(id))
    }
}

impl MediaHost for MemoryHost {
    fn timeline(&self, name: &str) -> HostResult<TimelineInfo> {
        let timeline = self.find_timeline(name)?;
        Ok(TimelineInfo {
            name: timeline.name.clone(),
            frame_rate: timeline.frame_rate,
        })
    }

    fn track_count(&self, timeline: &str, kind: TrackKind) -> HostResult<usize> {
        let timeline = self.find_timeline(timeline)?;
        Ok(timeline.tracks.iter().filter(|t| t.kind == kind).count())
    }

    fn track_name(
        &self,
        timeline: &str,
        kind: TrackKind,
        index: usize,
    ) -> HostResult<Option<String>> {
        Ok(self.find_track(timeline, kind, index)?.name.clone())
    }

    fn track_clips(
        &self,
        timeline: &str,
        kind: TrackKind,
        index: usize,
    ) -> HostResult<Vec<HostClip>> {
        let track = self.find_track(timeline, kind, index)?;
        Ok(track
            .clips
            .iter()
            .map(|c| HostClip {
                id: c.id,
                name: c.name.clone(),
                start: c.start,
                duration: c.duration,
                media: c.media,
            })
            .collect())
    }

    fn media_path(&self, media: MediaId) -> HostResult<Option<PathBuf>> {
        self.media(media)
            .map(|m| m.file_path.clone())
            .ok_or(HostError::MediaNotFound(media))
    }

    fn media_name(&self, media: MediaId) -> HostResult<String> {
        self.media(media)
            .map(|m| m.clip_name.clone())
            .ok_or(HostError::MediaNotFound(media))
    }

    fn relink_media(&mut self, media: MediaId, path: &Path) -> HostResult<()> {
        if self.rejected_relinks.contains(&media) {
            return Err(HostError::rejected("relink", "media is locked"));
        }
        self.media_mut(media)?.file_path = Some(path.to_path_buf());
        Ok(())
    }

    fn set_media_name(&mut self, media: MediaId, name: &str) -> HostResult<()> {
        if self.rejected_media_names.contains(&media) {
            return Err(HostError::rejected("media rename", "clip name is read-only"));
        }
        self.media_mut(media)?.clip_name = name.to_string();
        Ok(())
    }

    fn set_clip_name(&mut self, clip: ClipId, name: &str) -> HostResult<()> {
        if self.rejected_clip_names.contains(&clip) {
            return Err(HostError::rejected("clip rename", "clip is locked"));
        }
        let record = self
            .snapshot
            .timelines
            .iter_mut()
            .flat_map(|t| &mut t.tracks)
            .flat_map(|t| &mut t.clips)
            .find(|c| c.id == clip)
            .ok_or(HostError::ClipNotFound(clip))?;
        record.name = name.to_string();
        Ok(())
    }
}
