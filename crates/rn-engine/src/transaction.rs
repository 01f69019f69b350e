//! The rename/relink transaction engine.
//!
//! [`execute`] returns a [`Transaction`], an iterator that applies one plan
//! entry per call to `next()` and yields its [`TransactionResult`]. Each
//! active entry runs a three step unit:
//!
//! 1. rename the file `original -> target`;
//! 2. relink the media pool entry to `target`;
//! 3. rename every clip showing the media, and the media pool entry.
//!
//! A failed rename leaves everything untouched. A failed relink rolls the
//! rename back; if that rollback fails the entry is reported as an
//! [`InconsistentStateError`]. Failed name updates are warnings on an
//! otherwise applied entry. Entries are independent: one failing never
//! stops the next.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use rn_core::{BatchId, InconsistentStateError, MediaId, TransactionStepError};
use rn_host::{FileStore, MediaHost};

use crate::plan::{RenameAction, RenameEntry, RenamePlan};
use crate::report::BatchReport;

/// Knobs for a transaction run.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Checked before each entry; once cancelled, remaining entries are
    /// reported as [`Outcome::NotAttempted`].
    pub cancellation: CancellationToken,
}

impl ExecuteOptions {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// Why an entry failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFailure {
    /// Nothing was left changed.
    Step(TransactionStepError),
    /// The file and the project disagree; manual recovery needed.
    Inconsistent(InconsistentStateError),
}

impl std::fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step(e) => write!(f, "{e}"),
            Self::Inconsistent(e) => write!(f, "{e}"),
        }
    }
}

/// Final outcome of one plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// File renamed and relinked. `warnings` lists display names that could
    /// not be updated.
    Applied { path: PathBuf, warnings: Vec<String> },
    Failed { failure: EntryFailure },
    /// Inert entry; nothing to do.
    SkippedNoOp,
    /// Never reached because the batch was cancelled.
    NotAttempted,
}

/// Coarse status of an entry, as printed in status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryStatus {
    Pending,
    Applied,
    Failed,
    SkippedNoOp,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Applied => "Applied",
            Self::Failed => "Failed",
            Self::SkippedNoOp => "SkippedNoOp",
        };
        f.write_str(s)
    }
}

/// Result of one plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    pub index: usize,
    pub label: String,
    pub media: MediaId,
    pub original: PathBuf,
    pub target: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TransactionResult {
    pub fn status(&self) -> EntryStatus {
        match self.outcome {
            Outcome::Applied { .. } => EntryStatus::Applied,
            Outcome::Failed { .. } => EntryStatus::Failed,
            Outcome::SkippedNoOp => EntryStatus::SkippedNoOp,
            Outcome::NotAttempted => EntryStatus::Pending,
        }
    }

    pub fn inconsistency(&self) -> Option<&InconsistentStateError> {
        match &self.outcome {
            Outcome::Failed {
                failure: EntryFailure::Inconsistent(e),
            } => Some(e),
            _ => None,
        }
    }
}

/// Progress of one active entry through its unit.
enum EntryState {
    /// Nothing changed yet.
    Pending,
    /// File is at the target; the host still points at the original.
    Renamed,
    /// File and host both at the target.
    Relinked,
    Done(Outcome),
}

/// A running batch. Iterate to apply entries one at a time, or call
/// [`finish`](Self::finish) to apply the rest and collect the report.
pub struct Transaction<'a, H: MediaHost + ?Sized, F: FileStore + ?Sized> {
    host: &'a mut H,
    fs: &'a F,
    plan: &'a RenamePlan,
    options: ExecuteOptions,
    batch: BatchId,
    started_at: chrono::DateTime<Utc>,
    cursor: usize,
    cancelled: bool,
    results: Vec<TransactionResult>,
}

/// Start applying `plan`. Nothing happens until the transaction is iterated
/// or finished.
pub fn execute<'a, H: MediaHost + ?Sized, F: FileStore + ?Sized>(
    host: &'a mut H,
    fs: &'a F,
    plan: &'a RenamePlan,
    options: ExecuteOptions,
) -> Transaction<'a, H, F> {
    let batch = BatchId::new();
    tracing::info!(
        "Batch {batch}: {} entries ({} active)",
        plan.len(),
        plan.active().count()
    );
    Transaction {
        host,
        fs,
        plan,
        options,
        batch,
        started_at: Utc::now(),
        cursor: 0,
        cancelled: false,
        results: Vec::with_capacity(plan.len()),
    }
}

impl<H: MediaHost + ?Sized, F: FileStore + ?Sized> Transaction<'_, H, F> {
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    /// Results produced so far, in plan order.
    pub fn results(&self) -> &[TransactionResult] {
        &self.results
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Apply every remaining entry and return the batch report.
    pub fn finish(mut self) -> BatchReport {
        while self.next().is_some() {}
        let report = BatchReport {
            batch: self.batch,
            started_at: self.started_at,
            finished_at: Utc::now(),
            cancelled: self.cancelled,
            results: self.results,
        };
        tracing::info!(
            "Batch {}: {} applied, {} failed, {} skipped, {} not attempted",
            report.batch,
            report.applied(),
            report.failed(),
            report.skipped(),
            report.not_attempted()
        );
        report
    }

    fn run_entry(&mut self, entry: &RenameEntry) -> Outcome {
        let RenameAction::Rename {
            display_name,
            target,
            ..
        } = &entry.action
        else {
            tracing::debug!("[{}] no base name, skipping", entry.label);
            return Outcome::SkippedNoOp;
        };

        let media = entry.media_id();
        let mut warnings = Vec::new();
        let mut state = EntryState::Pending;

        loop {
            state = match state {
                EntryState::Pending => {
                    if let Err(e) = self.check_unchanged(entry) {
                        EntryState::Done(failed_step(e))
                    } else if entry.is_in_place() {
                        EntryState::Relinked
                    } else {
                        match self.fs.rename(&entry.original, target) {
                            Ok(()) => EntryState::Renamed,
                            Err(e) => EntryState::Done(failed_step(TransactionStepError::Rename {
                                from: entry.original.clone(),
                                to: target.clone(),
                                message: e.to_string(),
                            })),
                        }
                    }
                }
                EntryState::Renamed => match self.host.relink_media(media, target) {
                    Ok(()) => EntryState::Relinked,
                    Err(relink) => {
                        tracing::warn!(
                            "[{}] relink failed ({relink}); restoring {}",
                            entry.label,
                            entry.original.display()
                        );
                        let failure = match self.fs.rename(target, &entry.original) {
                            Ok(()) => EntryFailure::Step(TransactionStepError::Relink {
                                original: entry.original.clone(),
                                target: target.clone(),
                                message: relink.to_string(),
                            }),
                            Err(rollback) => EntryFailure::Inconsistent(InconsistentStateError {
                                media,
                                original: entry.original.clone(),
                                target: target.clone(),
                                relink_error: relink.to_string(),
                                rollback_error: rollback.to_string(),
                            }),
                        };
                        EntryState::Done(Outcome::Failed { failure })
                    }
                },
                EntryState::Relinked => {
                    for &clip in &entry.clips {
                        if let Err(e) = self.host.set_clip_name(clip, display_name) {
                            warnings.push(format!("clip {clip} keeps its old name: {e}"));
                        }
                    }
                    if let Err(e) = self.host.set_media_name(media, display_name) {
                        warnings.push(format!("media pool name not updated: {e}"));
                    }
                    EntryState::Done(Outcome::Applied {
                        path: target.clone(),
                        warnings: std::mem::take(&mut warnings),
                    })
                }
                EntryState::Done(outcome) => return outcome,
            };
        }
    }

    /// The host must still point the media at the planned original.
    fn check_unchanged(&self, entry: &RenameEntry) -> Result<(), TransactionStepError> {
        let media = entry.media_id();
        match self.host.media_path(media) {
            Ok(Some(path)) if path == entry.original => Ok(()),
            Ok(actual) => Err(TransactionStepError::Stale {
                media,
                expected: entry.original.clone(),
                actual,
            }),
            Err(e) => Err(TransactionStepError::Lookup {
                media,
                message: e.to_string(),
            }),
        }
    }
}

fn failed_step(error: TransactionStepError) -> Outcome {
    Outcome::Failed {
        failure: EntryFailure::Step(error),
    }
}

fn log_result(result: &TransactionResult) {
    match &result.outcome {
        Outcome::Applied { path, warnings } => {
            tracing::info!(
                "[{}] {} -> {}",
                result.label,
                result.original.display(),
                path.display()
            );
            for warning in warnings {
                tracing::warn!("[{}] {warning}", result.label);
            }
        }
        Outcome::Failed {
            failure: EntryFailure::Inconsistent(e),
        } => {
            tracing::error!("[{}] INCONSISTENT STATE, manual recovery required: {e}", result.label);
        }
        Outcome::Failed {
            failure: EntryFailure::Step(e),
        } => {
            tracing::error!("[{}] failed: {e}", result.label);
        }
        Outcome::SkippedNoOp => {}
        Outcome::NotAttempted => {
            tracing::debug!("[{}] not attempted", result.label);
        }
    }
}

impl<H: MediaHost + ?Sized, F: FileStore + ?Sized> Iterator for Transaction<'_, H, F> {
    type Item = TransactionResult;

    fn next(&mut self) -> Option<Self::Item> {
        let plan = self.plan;
        let entry = plan.entries.get(self.cursor)?;
        self.cursor += 1;

        if !self.cancelled && self.options.cancellation.is_cancelled() {
            tracing::info!(
                "Batch {} cancelled before entry {}",
                self.batch,
                entry.label
            );
            self.cancelled = true;
        }

        let outcome = if self.cancelled {
            Outcome::NotAttempted
        } else {
            self.run_entry(entry)
        };

        let result = TransactionResult {
            index: entry.index,
            label: entry.label.clone(),
            media: entry.media_id(),
            original: entry.original.clone(),
            target: entry.target().map(|t| t.to_path_buf()),
            outcome,
        };
        log_result(&result);
        self.results.push(result.clone());
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::deduplicate;
    use crate::inventory::{build_inventory, Selection};
    use crate::plan::build_plan;
    use assert_matches::assert_matches;
    use rn_core::config::NamingConfig;
    use rn_host::{MemoryHost, SnapshotBuilder};
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::path::Path;

    /// Paths as a set, with switchable rename failures.
    #[derive(Default)]
    struct MemFs {
        files: RefCell<HashSet<PathBuf>>,
        fail_from: HashSet<PathBuf>,
    }

    impl FileStore for MemFs {
        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_from.contains(from) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            let mut files = self.files.borrow_mut();
            if files.contains(to) {
                return Err(io::Error::new(io::ErrorKind::AlreadyExists, "exists"));
            }
            if !files.remove(from) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
            }
            files.insert(to.to_path_buf());
            Ok(())
        }
    }

    struct Setup {
        host: MemoryHost,
        fs: MemFs,
        media: Vec<MediaId>,
        plan: RenamePlan,
    }

    /// One media per base name on a single track, each used twice.
    fn setup(bases: &[&str]) -> Setup {
        let mut b = SnapshotBuilder::new("Doc");
        let track = b.audio_track("A1");
        let mut media = Vec::new();
        let fs = MemFs::default();
        for i in 0..bases.len() {
            let path = PathBuf::from(format!("/audio/take{i}.wav"));
            fs.files.borrow_mut().insert(path.clone());
            let id = b.media(path);
            b.clip(track, id, i as i64 * 100, 50);
            b.clip(track, id, 1000 + i as i64 * 100, 50);
            media.push(id);
        }
        let host = MemoryHost::new(b.build());

        let inventory = build_inventory(&host, &Selection::new("Timeline 1", vec![1])).unwrap();
        let unique = deduplicate(&inventory.occurrences);
        let names: HashMap<_, _> = media
            .iter()
            .zip(bases)
            .map(|(id, b)| (*id, b.to_string()))
            .collect();
        let plan = build_plan(&unique, &names, &NamingConfig::default(), &fs).unwrap();

        Setup {
            host,
            fs,
            media,
            plan,
        }
    }

    #[test]
    fn applies_all_three_steps() {
        let mut s = setup(&["Intro"]);
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        assert_eq!(report.applied(), 1);
        let target = PathBuf::from("/audio/01-Intro.wav");
        assert!(s.fs.exists(&target));
        assert!(!s.fs.exists(Path::new("/audio/take0.wav")));
        assert_eq!(s.host.media_path(s.media[0]).unwrap(), Some(target.clone()));
        assert_eq!(s.host.media_name(s.media[0]).unwrap(), "01-Intro");
        assert_matches!(
            &report.results[0].outcome,
            Outcome::Applied { path, warnings } if *path == target && warnings.is_empty()
        );
    }

    #[test]
    fn yields_results_in_plan_order() {
        let mut s = setup(&["A", "", "C"]);
        let statuses: Vec<_> = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default())
            .map(|r| (r.label.clone(), r.status()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("01".to_string(), EntryStatus::Applied),
                ("02".to_string(), EntryStatus::SkippedNoOp),
                ("03".to_string(), EntryStatus::Applied),
            ]
        );
        assert_eq!(
            s.host.media_path(s.media[1]).unwrap(),
            Some(PathBuf::from("/audio/take1.wav"))
        );
    }

    #[test]
    fn rename_failure_touches_nothing() {
        let mut s = setup(&["A", "B"]);
        s.fs.fail_from.insert(PathBuf::from("/audio/take0.wav"));
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        assert_matches!(
            &report.results[0].outcome,
            Outcome::Failed { failure: EntryFailure::Step(TransactionStepError::Rename { .. }) }
        );
        assert_eq!(report.results[1].status(), EntryStatus::Applied);
        assert_eq!(
            s.host.media_path(s.media[0]).unwrap(),
            Some(PathBuf::from("/audio/take0.wav"))
        );
        assert_eq!(s.host.media_name(s.media[0]).unwrap(), "take0.wav");
    }

    #[test]
    fn relink_failure_rolls_back() {
        let mut s = setup(&["A"]);
        s.host.reject_relink(s.media[0]);
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        assert_matches!(
            &report.results[0].outcome,
            Outcome::Failed { failure: EntryFailure::Step(TransactionStepError::Relink { .. }) }
        );
        assert!(s.fs.exists(Path::new("/audio/take0.wav")));
        assert!(!s.fs.exists(Path::new("/audio/01-A.wav")));
        assert!(report.inconsistent().is_empty());
    }

    #[test]
    fn failed_rollback_is_inconsistent() {
        let mut s = setup(&["A"]);
        s.host.reject_relink(s.media[0]);
        s.fs.fail_from.insert(PathBuf::from("/audio/01-A.wav"));
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        let inconsistent = report.inconsistent();
        assert_eq!(inconsistent.len(), 1);
        assert_eq!(inconsistent[0].target, PathBuf::from("/audio/01-A.wav"));
        assert_eq!(inconsistent[0].original, PathBuf::from("/audio/take0.wav"));
        assert!(s.fs.exists(Path::new("/audio/01-A.wav")));
    }

    #[test]
    fn name_failures_are_warnings() {
        let mut s = setup(&["A"]);
        let clip = s.plan.entries[0].clips[1];
        s.host.reject_clip_name(clip);
        s.host.reject_media_name(s.media[0]);
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        assert_matches!(
            &report.results[0].outcome,
            Outcome::Applied { warnings, .. } if warnings.len() == 2
        );
        assert_eq!(
            s.host.media_path(s.media[0]).unwrap(),
            Some(PathBuf::from("/audio/01-A.wav"))
        );
    }

    #[test]
    fn stale_entry_fails_without_mutation() {
        let mut s = setup(&["A"]);
        s.host
            .relink_media(s.media[0], Path::new("/elsewhere/take0.wav"))
            .unwrap();
        let report = execute(&mut s.host, &s.fs, &s.plan, ExecuteOptions::default()).finish();

        assert_matches!(
            &report.results[0].outcome,
            Outcome::Failed { failure: EntryFailure::Step(TransactionStepError::Stale { actual: Some(_), .. }) }
        );
        assert!(s.fs.exists(Path::new("/audio/take0.wav")));
    }

    #[test]
    fn in_place_entry_only_renames_clips() {
        let mut b = SnapshotBuilder::new("Doc");
        let track = b.audio_track("A1");
        let id = b.media("/audio/01-Intro.wav");
        let clip = b.clip(track, id, 0, 10);
        let mut host = MemoryHost::new(b.build());
        host.set_clip_name(clip, "something else").unwrap();
        host.reject_relink(id);
        let fs = MemFs::default();
        fs.files.borrow_mut().insert(PathBuf::from("/audio/01-Intro.wav"));

        let inventory = build_inventory(&host, &Selection::new("Timeline 1", vec![1])).unwrap();
        let unique = deduplicate(&inventory.occurrences);
        let names = HashMap::from([(id, "Intro".to_string())]);
        let plan = build_plan(&unique, &names, &NamingConfig::default(), &fs).unwrap();

        let report = execute(&mut host, &fs, &plan, ExecuteOptions::default()).finish();
        assert_eq!(report.applied(), 1);
        assert_eq!(host.clip(clip).unwrap().name, "01-Intro");
    }

    #[test]
    fn cancellation_stops_between_entries() {
        let mut s = setup(&["A", "B", "C"]);
        let token = CancellationToken::new();
        let options = ExecuteOptions::default().with_cancellation(token.clone());

        let mut tx = execute(&mut s.host, &s.fs, &s.plan, options);
        assert_eq!(tx.next().unwrap().status(), EntryStatus::Applied);
        token.cancel();
        let report = tx.finish();

        assert!(report.cancelled);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.not_attempted(), 2);
        assert!(report.results[1..]
            .iter()
            .all(|r| r.outcome == Outcome::NotAttempted && r.status() == EntryStatus::Pending));
        assert!(s.fs.exists(Path::new("/audio/take1.wav")));
    }
}
