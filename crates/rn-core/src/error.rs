//! Error taxonomy for a rename batch.
//!
//! The four stage errors mirror where a batch can stop:
//!
//! - [`InventoryError`] -- the selection could not be read; nothing changed.
//! - [`PlanError`] -- the requested names are not safe to apply; nothing
//!   changed, the caller can edit the names and retry.
//! - [`TransactionStepError`] -- one entry failed; the batch carries on.
//! - [`InconsistentStateError`] -- an entry failed *and* its rollback failed.
//!   The file and the project disagree and an operator has to fix it.
//!
//! [`Error`] unifies them (plus I/O and project-file failures) for callers
//! that only need a single error type.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ids::MediaId;
use crate::media::TrackKind;

// ---------------------------------------------------------------------------
// InventoryError
// ---------------------------------------------------------------------------

/// Failure to enumerate the selected timeline or tracks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// The selected timeline does not exist in the project.
    #[error("timeline not found: {0}")]
    UnknownTimeline(String),

    /// A selected track index is outside the timeline's track range.
    #[error("{kind} track {index} does not exist on timeline '{timeline}' ({count} tracks)")]
    UnknownTrack {
        timeline: String,
        kind: TrackKind,
        index: usize,
        count: usize,
    },

    /// The host failed while enumerating.
    #[error("host error while reading timeline '{timeline}': {message}")]
    Host { timeline: String, message: String },
}

// ---------------------------------------------------------------------------
// PlanError
// ---------------------------------------------------------------------------

/// A single reason a rename plan was rejected.
///
/// Entry numbers are the 1-based sequence indices shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Several entries resolve to the same target path.
    DuplicateTarget { target: PathBuf, entries: Vec<usize> },

    /// The target already exists on disk and nothing in the plan vacates it.
    ExternalCollision { entry: usize, target: PathBuf },

    /// The base name would escape the original directory or is unusable.
    InvalidBaseName {
        entry: usize,
        base: String,
        reason: &'static str,
    },

    /// Several media pool entries point at the same file on disk.
    SharedSource {
        source_path: PathBuf,
        entries: Vec<usize>,
    },

    /// The target is occupied by a file that a later entry vacates, so
    /// sequential execution would collide with it.
    OrderConflict {
        entry: usize,
        target: PathBuf,
        vacated_by: usize,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTarget { target, entries } => write!(
                f,
                "entries {} all resolve to {}",
                join_entries(entries),
                target.display()
            ),
            Self::ExternalCollision { entry, target } => write!(
                f,
                "entry {entry}: {} already exists",
                target.display()
            ),
            Self::InvalidBaseName {
                entry,
                base,
                reason,
            } => write!(f, "entry {entry}: base name {base:?} {reason}"),
            Self::SharedSource {
                source_path,
                entries,
            } => write!(
                f,
                "entries {} share the source file {}",
                join_entries(entries),
                source_path.display()
            ),
            Self::OrderConflict {
                entry,
                target,
                vacated_by,
            } => write!(
                f,
                "entry {entry}: {} is only vacated later by entry {vacated_by}",
                target.display()
            ),
        }
    }
}

fn join_entries(entries: &[usize]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The plan failed validation. No file or project state has been touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("rename plan rejected: {}", join_conflicts(.conflicts))]
pub struct PlanError {
    pub conflicts: Vec<Conflict>,
}

impl PlanError {
    pub fn new(conflicts: Vec<Conflict>) -> Self {
        Self { conflicts }
    }
}

// ---------------------------------------------------------------------------
// TransactionStepError
// ---------------------------------------------------------------------------

/// Failure of one entry's rename/relink unit, isolated to that entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionStepError {
    /// The host could not report the media's current path.
    #[error("could not read the current path of media {media}: {message}")]
    Lookup { media: MediaId, message: String },

    /// The media moved between planning and execution; nothing was touched.
    #[error(
        "media {media} changed since planning: expected {}, host reports {}",
        .expected.display(),
        display_optional(.actual.as_deref())
    )]
    Stale {
        media: MediaId,
        expected: PathBuf,
        actual: Option<PathBuf>,
    },

    /// Renaming the file on disk failed; nothing was touched.
    #[error("rename {} -> {} failed: {message}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    /// The host refused the relink; the file was restored to its original path.
    #[error(
        "host rejected relink to {}: {message} (file restored to {})",
        .target.display(),
        .original.display()
    )]
    Relink {
        original: PathBuf,
        target: PathBuf,
        message: String,
    },
}

fn display_optional(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "no file path".to_string(),
    }
}

// ---------------------------------------------------------------------------
// InconsistentStateError
// ---------------------------------------------------------------------------

/// The relink failed and restoring the file to its original path failed too.
///
/// The file now lives at `target` while the project still references
/// `original`. This is never resolved automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error(
    "media {media}: file is at {} but the project still points at {}; \
     relink failed ({relink_error}) and restoring the file failed ({rollback_error})",
    .target.display(),
    .original.display()
)]
pub struct InconsistentStateError {
    pub media: MediaId,
    pub original: PathBuf,
    pub target: PathBuf,
    pub relink_error: String,
    pub rollback_error: String,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Unified error type for reelname.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Transaction error: {0}")]
    Step(#[from] TransactionStepError),

    #[error("Inconsistent state: {0}")]
    Inconsistent(#[from] InconsistentStateError),

    /// A project snapshot could not be read, parsed or written.
    #[error("Project file error [{}]: {message}", .path.display())]
    Project { path: PathBuf, message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Convenience constructor for [`Error::Project`].
    pub fn project(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::Project {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is raised before any file or project mutation, so
    /// the caller can fix its inputs and retry.
    pub fn is_safe_to_retry(&self) -> bool {
        match self {
            Error::Inventory(_) | Error::Plan(_) | Error::Validation(_) | Error::Project { .. } => {
                true
            }
            Error::Step(_) | Error::Inconsistent(_) | Error::Io { .. } => false,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
