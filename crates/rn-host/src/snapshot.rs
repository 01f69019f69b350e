//! Project snapshots: a serializable picture of the parts of a project the
//! engine touches (timelines, their tracks and clips, and the media pool).
//!
//! [`ProjectFile`] ties a snapshot to a JSON file on disk. It is loaded into
//! a [`MemoryHost`], mutated through the [`MediaHost`](crate::MediaHost)
//! trait like any other host, and written back with an atomic replace.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rn_core::{ClipId, Error, MediaId, Result, TrackKind};

use crate::memory::MemoryHost;

/// Frame rate assumed when a timeline does not declare one.
const DEFAULT_FRAME_RATE: f64 = 24.0;

/// Root of a project snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub name: String,
    #[serde(default)]
    pub timelines: Vec<TimelineRecord>,
    #[serde(default)]
    pub media_pool: Vec<MediaRecord>,
}

/// A timeline and its tracks in host order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub name: String,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

/// A track. Tracks are numbered from 1 within their kind, in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub kind: TrackKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub clips: Vec<ClipRecord>,
}

/// A clip placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    pub id: ClipId,
    pub name: String,
    pub start: i64,
    pub duration: i64,
    #[serde(default)]
    pub media: Option<MediaId>,
}

/// A media pool entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: MediaId,
    pub clip_name: String,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl ProjectSnapshot {
    /// Parse a snapshot from JSON and check its internal consistency.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| Error::Validation(format!("project parse error: {e}")))?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Validation(format!("project serialize error: {e}")))
    }

    /// Reject snapshots with duplicate identities.
    ///
    /// Clips pointing at media that is missing from the pool are allowed;
    /// they surface as orphans during inventory.
    pub fn check(&self) -> Result<()> {
        let mut timelines = HashSet::new();
        for timeline in &self.timelines {
            if !timelines.insert(timeline.name.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate timeline name: {}",
                    timeline.name
                )));
            }
        }

        let mut media = HashSet::new();
        for record in &self.media_pool {
            if !media.insert(record.id) {
                return Err(Error::Validation(format!("duplicate media id: {}", record.id)));
            }
        }

        let mut clips = HashSet::new();
        for clip in self
            .timelines
            .iter()
            .flat_map(|t| &t.tracks)
            .flat_map(|t| &t.clips)
        {
            if !clips.insert(clip.id) {
                return Err(Error::Validation(format!("duplicate clip id: {}", clip.id)));
            }
        }

        Ok(())
    }
}

/// A project snapshot backed by a JSON file.
#[derive(Debug)]
pub struct ProjectFile {
    path: PathBuf,
    host: MemoryHost,
}

impl ProjectFile {
    /// Read and validate the snapshot at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::project(path, e))?;
        let snapshot = ProjectSnapshot::from_json(&contents).map_err(|e| match e {
            Error::Validation(message) => Error::project(path, message),
            other => other,
        })?;

        tracing::debug!(
            "Loaded project '{}' from {} ({} timelines, {} media)",
            snapshot.name,
            path.display(),
            snapshot.timelines.len(),
            snapshot.media_pool.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            host: MemoryHost::new(snapshot),
        })
    }

    /// The file this project was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut MemoryHost {
        &mut self.host
    }

    /// Write the current state back to [`path`](Self::path).
    ///
    /// The JSON goes to a temporary file in the same directory which then
    /// replaces the original, so a crash never leaves a truncated project.
    pub fn save(&self) -> Result<()> {
        let json = self.host.snapshot().to_json_pretty()?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::project(&self.path, format!("failed to create temp file: {e}")))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| Error::project(&self.path, format!("failed to write: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::project(&self.path, format!("failed to replace: {}", e.error)))?;

        tracing::debug!("Saved project to {}", self.path.display());
        Ok(())
    }
}
