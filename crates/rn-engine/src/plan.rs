//! Rename plans: user base names turned into validated target paths.
//!
//! Building a plan is pure apart from existence checks against the
//! [`FileStore`]. Every problem found is collected into one [`PlanError`], so
//! the user can fix all names in one go.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use rn_core::config::NamingConfig;
use rn_core::{ClipId, Conflict, MediaId, PlanError};
use rn_host::FileStore;

use crate::dedup::UniqueMedia;
use crate::inventory::MediaReference;

/// What execution does with an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RenameAction {
    /// Empty base name: nothing is touched.
    Inert,
    Rename {
        /// `{index}-{base}.{ext}`
        file_name: String,
        /// `{index}-{base}`, applied to the clips and the media pool entry.
        display_name: String,
        /// Same directory as the original.
        target: PathBuf,
    },
}

/// One unique media file in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameEntry {
    /// 1-based sequence index.
    pub index: usize,
    /// Zero-padded sequence index.
    pub label: String,
    pub media: Arc<MediaReference>,
    /// Every clip that shows this media.
    pub clips: Vec<ClipId>,
    pub original: PathBuf,
    /// Trimmed base name, empty for inert entries.
    pub base: String,
    pub action: RenameAction,
}

impl RenameEntry {
    pub fn media_id(&self) -> MediaId {
        self.media.id
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.action, RenameAction::Inert)
    }

    pub fn target(&self) -> Option<&Path> {
        match &self.action {
            RenameAction::Inert => None,
            RenameAction::Rename { target, .. } => Some(target),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match &self.action {
            RenameAction::Inert => None,
            RenameAction::Rename { display_name, .. } => Some(display_name),
        }
    }

    /// The target is the file's current path; only names change.
    pub fn is_in_place(&self) -> bool {
        self.target() == Some(self.original.as_path())
    }
}

/// A validated, ordered set of renames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenamePlan {
    pub entries: Vec<RenameEntry>,
    /// Zero-padding width of the sequence index.
    pub width: usize,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that will touch the file or the project.
    pub fn active(&self) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter().filter(|e| !e.is_inert())
    }
}

/// Build and validate the rename plan for `unique`.
///
/// `base_names` maps media identities to user base names. Names are trimmed;
/// a missing or blank name makes the entry inert. Nothing on disk or in the
/// host is modified.
pub fn build_plan<F: FileStore + ?Sized>(
    unique: &[UniqueMedia],
    base_names: &HashMap<MediaId, String>,
    naming: &NamingConfig,
    fs: &F,
) -> Result<RenamePlan, PlanError> {
    let width = naming.index_width(unique.len());
    let mut conflicts = Vec::new();
    let mut entries = Vec::with_capacity(unique.len());

    for (i, group) in unique.iter().enumerate() {
        let index = i + 1;
        let label = format!("{index:0width$}");
        let media = Arc::clone(&group.media);
        let original = media.path.clone();
        let base = base_names
            .get(&media.id)
            .map(|b| b.trim().to_string())
            .unwrap_or_default();

        let action = if base.is_empty() {
            RenameAction::Inert
        } else if let Some(reason) = invalid_base_reason(&base) {
            conflicts.push(Conflict::InvalidBaseName {
                entry: index,
                base: base.clone(),
                reason,
            });
            RenameAction::Inert
        } else {
            let display_name = format!("{label}-{base}");
            let file_name = match &media.extension {
                Some(ext) => format!("{display_name}.{ext}"),
                None => display_name.clone(),
            };
            let target = match original.parent() {
                Some(dir) => dir.join(&file_name),
                None => PathBuf::from(&file_name),
            };
            RenameAction::Rename {
                file_name,
                display_name,
                target,
            }
        };

        entries.push(RenameEntry {
            index,
            label,
            clips: group.occurrences.iter().map(|o| o.clip).collect(),
            original,
            base,
            media,
            action,
        });
    }

    conflicts.extend(find_conflicts(
        &entries,
        naming.case_insensitive_collisions,
        fs,
    ));

    if !conflicts.is_empty() {
        for conflict in &conflicts {
            tracing::debug!("Plan conflict: {conflict}");
        }
        return Err(PlanError::new(conflicts));
    }

    let plan = RenamePlan { entries, width };
    tracing::debug!(
        "Rename plan: {} entries, {} active, width {}",
        plan.len(),
        plan.active().count(),
        width
    );
    for entry in plan.active() {
        if let Some(target) = entry.target() {
            tracing::debug!(
                "  {} {} -> {}",
                entry.label,
                entry.original.display(),
                target.display()
            );
        }
    }
    Ok(plan)
}

/// Strip a `{digits}-` prefix of exactly `width` digits from a file stem.
///
/// Used to show the base of an already indexed file without its old index.
pub fn current_base(stem: &str, width: usize) -> &str {
    let bytes = stem.as_bytes();
    if width > 0
        && bytes.len() > width
        && bytes[..width].iter().all(u8::is_ascii_digit)
        && bytes[width] == b'-'
    {
        &stem[width + 1..]
    } else {
        stem
    }
}

fn invalid_base_reason(base: &str) -> Option<&'static str> {
    if base == "." || base == ".." {
        Some("is a relative directory name")
    } else if base.contains('/') || base.contains('\\') {
        Some("contains a path separator")
    } else if base.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    }
}

fn path_key(path: &Path, fold_case: bool) -> PathBuf {
    if fold_case {
        PathBuf::from(path.to_string_lossy().to_lowercase())
    } else {
        path.to_path_buf()
    }
}

/// Collision checks across active entries.
fn find_conflicts<F: FileStore + ?Sized>(
    entries: &[RenameEntry],
    fold_case: bool,
    fs: &F,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let active: Vec<(&RenameEntry, &Path)> = entries
        .iter()
        .filter_map(|e| e.target().map(|t| (e, t)))
        .collect();

    // Several media pool entries backed by one file. Inert entries count:
    // renaming the file would leave them pointing at nothing.
    let mut by_source: BTreeMap<PathBuf, Vec<&RenameEntry>> = BTreeMap::new();
    for entry in entries {
        by_source
            .entry(path_key(&entry.original, fold_case))
            .or_default()
            .push(entry);
    }
    for entry in entries {
        let Some(group) = by_source.get(&path_key(&entry.original, fold_case)) else {
            continue;
        };
        if group.len() > 1
            && group[0].index == entry.index
            && group.iter().any(|e| !e.is_inert())
        {
            conflicts.push(Conflict::SharedSource {
                source_path: entry.original.clone(),
                entries: group.iter().map(|e| e.index).collect(),
            });
        }
    }

    // Several entries aiming at one target.
    let mut by_target: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (entry, target) in &active {
        by_target
            .entry(path_key(target, fold_case))
            .or_default()
            .push(entry.index);
    }
    for (entry, target) in &active {
        if let Some(group) = by_target.get(&path_key(target, fold_case)) {
            if group.len() > 1 && group[0] == entry.index {
                conflicts.push(Conflict::DuplicateTarget {
                    target: target.to_path_buf(),
                    entries: group.clone(),
                });
            }
        }
    }

    // Paths that an entry moves away from, keyed to the entry moving.
    let vacated: HashMap<PathBuf, usize> = active
        .iter()
        .filter(|(entry, target)| {
            path_key(target, fold_case) != path_key(&entry.original, fold_case)
        })
        .map(|(entry, _)| (path_key(&entry.original, fold_case), entry.index))
        .collect();

    for (entry, target) in &active {
        let key = path_key(target, fold_case);
        if key == path_key(&entry.original, fold_case) {
            continue;
        }
        if by_target.get(&key).is_some_and(|g| g.len() > 1) {
            continue;
        }
        match vacated.get(&key) {
            Some(&by) if by < entry.index => {}
            Some(&by) => conflicts.push(Conflict::OrderConflict {
                entry: entry.index,
                target: target.to_path_buf(),
                vacated_by: by,
            }),
            None if fs.exists(target) => conflicts.push(Conflict::ExternalCollision {
                entry: entry.index,
                target: target.to_path_buf(),
            }),
            None => {}
        }
    }

    conflicts
}
