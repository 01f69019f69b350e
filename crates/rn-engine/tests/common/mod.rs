//! Shared test harness for engine integration tests.
//!
//! Provides [`Harness`], which writes real audio placeholder files into a
//! temporary directory and builds a [`MemoryHost`] project pointing at them,
//! and [`FailingFs`], a [`LocalFs`] wrapper that refuses chosen renames.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use rn_core::config::NamingConfig;
use rn_core::{ClipId, MediaId, PlanError};
use rn_engine::{build_inventory, build_plan, deduplicate, RenamePlan, Selection};
use rn_host::{FileStore, LocalFs, MemoryHost, SnapshotBuilder};
use tempfile::TempDir;

pub const TIMELINE: &str = "Edit";

/// A temporary audio folder plus a project that references it.
pub struct Harness {
    pub dir: TempDir,
    pub host: MemoryHost,
    /// Media in the order their first clip appears on the timeline.
    pub media: Vec<MediaId>,
    /// Clips per media, same order as `media`.
    pub clips: Vec<Vec<ClipId>>,
}

impl Harness {
    /// One media file per entry of `uses`, each placed `uses[i]` times.
    pub fn new(uses: &[usize]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut b = SnapshotBuilder::new("Feature");
        b.timeline(TIMELINE, 25.0);
        let dialogue = b.audio_track("Dialogue");
        let music = b.audio_track("Music");

        let mut media = Vec::new();
        let mut clips = Vec::new();
        for (i, &count) in uses.iter().enumerate() {
            let path = dir.path().join(format!("rec_{i:03}.wav"));
            std::fs::write(&path, format!("pcm {i}")).unwrap();
            let id = b.media(path);
            let mut placed = Vec::new();
            for n in 0..count {
                // First use on dialogue in media order, repeats later on music.
                let (track, start) = if n == 0 {
                    (dialogue, i as i64 * 250)
                } else {
                    (music, 100_000 + (i * 10 + n) as i64 * 250)
                };
                placed.push(b.clip(track, id, start, 200));
            }
            media.push(id);
            clips.push(placed);
        }

        Self {
            dir,
            host: MemoryHost::new(b.build()),
            media,
            clips,
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn original(&self, i: usize) -> PathBuf {
        self.file(&format!("rec_{i:03}.wav"))
    }

    /// Inventory both tracks, deduplicate, and plan with `bases` in media order.
    pub fn plan<F: FileStore + ?Sized>(&self, bases: &[&str], fs: &F) -> Result<RenamePlan, PlanError> {
        let inventory = build_inventory(&self.host, &Selection::new(TIMELINE, vec![1, 2])).unwrap();
        let unique = deduplicate(&inventory.occurrences);
        let names: HashMap<_, _> = self
            .media
            .iter()
            .zip(bases)
            .map(|(id, b)| (*id, b.to_string()))
            .collect();
        let naming = NamingConfig {
            case_insensitive_collisions: false,
            ..NamingConfig::default()
        };
        build_plan(&unique, &names, &naming, fs)
    }

    /// Names of every file currently in the directory, sorted.
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// [`LocalFs`] that fails renames whose source is in `fail_from`, and
/// records every rename it performs.
#[derive(Default)]
pub struct FailingFs {
    pub fail_from: HashSet<PathBuf>,
    pub renames: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl FailingFs {
    pub fn failing(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            fail_from: paths.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl FileStore for FailingFs {
    fn exists(&self, path: &Path) -> bool {
        LocalFs.exists(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail_from.contains(from) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "volume is read-only",
            ));
        }
        LocalFs.rename(from, to)?;
        self.renames
            .borrow_mut()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }
}
