//! Inventory of the clips on the selected audio tracks of a timeline.
//!
//! Every clip is tied to its backing media through the host's media pool
//! identity. Two clips with equal paths but different identities stay two
//! media references; the path is only ever data, never a key.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use rn_core::{ClipId, InventoryError, MediaId, Timecode, TrackKind};
use rn_host::{HostError, MediaHost, TimelineInfo};

/// The timeline and audio tracks to read, fixed for the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub timeline: String,
    /// 1-based audio track indices, in the order they were picked.
    pub tracks: Vec<usize>,
}

impl Selection {
    pub fn new(timeline: impl Into<String>, tracks: Vec<usize>) -> Self {
        Self {
            timeline: timeline.into(),
            tracks,
        }
    }

    /// Select every audio track of `timeline`, in host order.
    pub fn all_tracks<H: MediaHost + ?Sized>(
        host: &H,
        timeline: &str,
    ) -> Result<Self, InventoryError> {
        let count = host
            .track_count(timeline, TrackKind::Audio)
            .map_err(|e| map_host_error(timeline, e))?;
        Ok(Self::new(timeline, (1..=count).collect()))
    }
}

/// A selected track as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRef {
    pub index: usize,
    pub name: String,
}

/// A media pool entry with a file behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    pub id: MediaId,
    /// Absolute path of the file at inventory time.
    pub path: PathBuf,
    /// Extension exactly as it appears on disk, without the dot.
    pub extension: Option<String>,
    /// Media pool clip name at inventory time.
    pub clip_name: String,
}

/// One placement of a media file on a selected track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipOccurrence {
    pub clip: ClipId,
    pub name: String,
    pub track: TrackRef,
    pub start_frame: i64,
    pub start: Timecode,
    /// Length in frames.
    pub duration: i64,
    pub media: Arc<MediaReference>,
}

/// Why a clip was left out of the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "media", rename_all = "snake_case")]
pub enum OrphanReason {
    /// The clip has no media pool entry (generators, titles, gaps).
    NoMedia,
    /// The clip points at media the host does not know.
    UnknownMedia(MediaId),
    /// The media pool entry exists but has no file.
    NoFilePath(MediaId),
}

impl std::fmt::Display for OrphanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMedia => write!(f, "no backing media"),
            Self::UnknownMedia(id) => write!(f, "media {id} not found in the media pool"),
            Self::NoFilePath(id) => write!(f, "media {id} has no file path"),
        }
    }
}

/// A clip with no usable media. Reported, never renamed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Orphan {
    pub clip: ClipId,
    pub name: String,
    pub track: TrackRef,
    pub start_frame: i64,
    pub reason: OrphanReason,
}

/// Result of one inventory pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub timeline: TimelineInfo,
    /// Selected tracks in selection order, duplicates removed.
    pub tracks: Vec<TrackRef>,
    /// Occurrences ordered by track selection order, then start frame.
    pub occurrences: Vec<ClipOccurrence>,
    pub orphans: Vec<Orphan>,
}

/// Walk the selected tracks and collect every clip with resolvable media.
///
/// All track indices are checked before any clip is read, so an invalid
/// selection fails without partial output. Orphaned clips do not fail the
/// inventory.
pub fn build_inventory<H: MediaHost + ?Sized>(
    host: &H,
    selection: &Selection,
) -> Result<Inventory, InventoryError> {
    let timeline_name = selection.timeline.as_str();
    let timeline = host
        .timeline(timeline_name)
        .map_err(|e| map_host_error(timeline_name, e))?;
    let count = host
        .track_count(timeline_name, TrackKind::Audio)
        .map_err(|e| map_host_error(timeline_name, e))?;

    let mut seen = HashSet::new();
    let mut indices = Vec::with_capacity(selection.tracks.len());
    for &index in &selection.tracks {
        if index == 0 || index > count {
            return Err(InventoryError::UnknownTrack {
                timeline: timeline_name.to_string(),
                kind: TrackKind::Audio,
                index,
                count,
            });
        }
        if seen.insert(index) {
            indices.push(index);
        } else {
            tracing::debug!("Audio track {index} selected more than once; ignoring repeat");
        }
    }

    let mut resolved: HashMap<MediaId, Result<Arc<MediaReference>, OrphanReason>> =
        HashMap::new();
    let mut tracks = Vec::with_capacity(indices.len());
    let mut occurrences = Vec::new();
    let mut orphans = Vec::new();

    for index in indices {
        let name = host
            .track_name(timeline_name, TrackKind::Audio, index)
            .map_err(|e| map_host_error(timeline_name, e))?
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Audio Track {index}"));
        let track = TrackRef { index, name };

        let mut clips = host
            .track_clips(timeline_name, TrackKind::Audio, index)
            .map_err(|e| map_host_error(timeline_name, e))?;
        clips.sort_by_key(|c| c.start);

        for clip in clips {
            let media = match clip.media {
                None => Err(OrphanReason::NoMedia),
                Some(id) => match resolved.entry(id) {
                    Entry::Occupied(e) => e.get().clone(),
                    Entry::Vacant(e) => e
                        .insert(resolve_media(host, timeline_name, id)?)
                        .clone(),
                },
            };

            match media {
                Ok(media) => occurrences.push(ClipOccurrence {
                    clip: clip.id,
                    name: clip.name,
                    track: track.clone(),
                    start_frame: clip.start,
                    start: Timecode::from_frames(clip.start, timeline.frame_rate),
                    duration: clip.duration,
                    media,
                }),
                Err(reason) => {
                    tracing::warn!(
                        "Skipping clip '{}' on {} at frame {}: {reason}",
                        clip.name,
                        track.name,
                        clip.start
                    );
                    orphans.push(Orphan {
                        clip: clip.id,
                        name: clip.name,
                        track: track.clone(),
                        start_frame: clip.start,
                        reason,
                    });
                }
            }
        }

        tracks.push(track);
    }

    tracing::debug!(
        "Inventory of '{}': {} clips on {} tracks, {} orphans",
        timeline.name,
        occurrences.len(),
        tracks.len(),
        orphans.len()
    );

    Ok(Inventory {
        timeline,
        tracks,
        occurrences,
        orphans,
    })
}

/// Resolve a media identity once. Missing media and media without a file
/// become orphan reasons; any other host failure aborts the inventory.
fn resolve_media<H: MediaHost + ?Sized>(
    host: &H,
    timeline: &str,
    id: MediaId,
) -> Result<Result<Arc<MediaReference>, OrphanReason>, InventoryError> {
    let path = match host.media_path(id) {
        Ok(Some(path)) => path,
        Ok(None) => return Ok(Err(OrphanReason::NoFilePath(id))),
        Err(HostError::MediaNotFound(_)) => return Ok(Err(OrphanReason::UnknownMedia(id))),
        Err(e) => return Err(map_host_error(timeline, e)),
    };
    let clip_name = match host.media_name(id) {
        Ok(name) => name,
        Err(HostError::MediaNotFound(_)) => return Ok(Err(OrphanReason::UnknownMedia(id))),
        Err(e) => return Err(map_host_error(timeline, e)),
    };

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    Ok(Ok(Arc::new(MediaReference {
        id,
        path,
        extension,
        clip_name,
    })))
}

fn map_host_error(timeline: &str, err: HostError) -> InventoryError {
    match err {
        HostError::TimelineNotFound(name) => InventoryError::UnknownTimeline(name),
        other => InventoryError::Host {
            timeline: timeline.to_string(),
            message: other.to_string(),
        },
    }
}
