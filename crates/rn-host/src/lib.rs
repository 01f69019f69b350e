//! # rn-host
//!
//! Boundaries between the rename engine and the outside world.
//!
//! This crate provides:
//!
//! - **[`MediaHost`]** trait -- the narrow capability set the engine needs
//!   from an editing application (enumerate tracks and clips, resolve and
//!   relink media, rename clips).
//! - **[`FileStore`]** trait -- the two filesystem operations the engine
//!   performs, with [`LocalFs`] as the real implementation.
//! - **[`MemoryHost`]** -- an in-memory host over a [`ProjectSnapshot`], with
//!   switches to make individual host mutations fail.
//! - **[`ProjectFile`]** -- a snapshot loaded from and saved back to a JSON
//!   file, so a project can be processed without the editing application.
//! - **[`SnapshotBuilder`]** -- builds snapshots in code.

pub mod builder;
pub mod fs;
pub mod host;
pub mod memory;
pub mod snapshot;

// Re-export key types at the crate root.
pub use builder::SnapshotBuilder;
pub use fs::{FileStore, LocalFs};
pub use host::{HostClip, HostError, HostResult, MediaHost, TimelineInfo};
pub use memory::MemoryHost;
pub use snapshot::{ClipRecord, MediaRecord, ProjectFile, ProjectSnapshot, TimelineRecord, TrackRecord};
