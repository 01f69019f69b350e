//! Plain-text terminal output for each subcommand.

use std::io::{self, Write};
use std::path::Path;

use rn_core::{PlanError, Timecode};
use rn_engine::{
    BatchReport, EntryFailure, Inventory, Outcome, RenameAction, RenamePlan, TrackRef,
    TransactionResult,
};

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Clip table for `inspect`.
pub fn inventory<W: Write>(w: &mut W, inv: &Inventory) -> io::Result<()> {
    writeln!(
        w,
        "Timeline: {} ({:.3} fps)",
        inv.timeline.name, inv.timeline.frame_rate
    )?;
    writeln!(
        w,
        "{:<18} {:<11} {:<11} {:>9} {:>7}  {:<24} File",
        "Track", "Start", "Duration", "Frame", "Frames", "Clip"
    )?;

    for occ in &inv.occurrences {
        writeln!(
            w,
            "{:<18} {:<11} {:<11} {:>9} {:>7}  {:<24} {}",
            format!("{} {}", occ.track.index, occ.track.name),
            occ.start.to_string(),
            Timecode::from_frames(occ.duration, inv.timeline.frame_rate).to_string(),
            occ.start_frame,
            occ.duration,
            occ.name,
            occ.media.path.display()
        )?;
    }
    writeln!(w, "\n{} clips", inv.occurrences.len())?;

    if !inv.orphans.is_empty() {
        writeln!(w, "\nSkipped clips ({}):", inv.orphans.len())?;
        for orphan in &inv.orphans {
            writeln!(
                w,
                "  {} on {} at frame {}: {}",
                orphan.name, orphan.track.name, orphan.start_frame, orphan.reason
            )?;
        }
    }
    Ok(())
}

/// Track list for `tracks`.
pub fn tracks<W: Write>(w: &mut W, tracks: &[(TrackRef, usize)]) -> io::Result<()> {
    if tracks.is_empty() {
        return writeln!(w, "No audio tracks");
    }
    for (track, clips) in tracks {
        writeln!(
            w,
            "  [{}] {}  ({} clip{})",
            track.index,
            track.name,
            clips,
            if *clips == 1 { "" } else { "s" }
        )?;
    }
    Ok(())
}

/// Before/after table for `plan` and `apply`.
pub fn plan<W: Write>(w: &mut W, plan: &RenamePlan) -> io::Result<()> {
    for entry in &plan.entries {
        let original = file_name(&entry.original);
        let clips = entry.clips.len();
        let uses = format!("{clips} clip{}", if clips == 1 { "" } else { "s" });
        match &entry.action {
            RenameAction::Inert => {
                writeln!(w, "  {}  {original}  (unchanged, {uses})", entry.label)?;
            }
            RenameAction::Rename { file_name, .. } if entry.is_in_place() => {
                writeln!(w, "  {}  {file_name}  (already named, {uses})", entry.label)?;
            }
            RenameAction::Rename { file_name, .. } => {
                writeln!(w, "  {}  {original} -> {file_name}  ({uses})", entry.label)?;
            }
        }
    }
    writeln!(
        w,
        "\n{} of {} files will be renamed",
        plan.active().count(),
        plan.len()
    )
}

/// Every conflict of a rejected plan, one per line.
pub fn conflicts<W: Write>(w: &mut W, err: &PlanError) -> io::Result<()> {
    writeln!(w, "Rename plan rejected, nothing was changed:")?;
    for conflict in &err.conflicts {
        writeln!(w, "  - {conflict}")?;
    }
    Ok(())
}

/// One status line (plus indented detail lines) per transaction result.
pub fn status_line(result: &TransactionResult) -> String {
    let status = result.status().to_string();
    let original = result.original.display();
    match &result.outcome {
        Outcome::Applied { path, warnings } => {
            let mut line = format!("[{}] {status:<12} {original} -> {}", result.label, path.display());
            for warning in warnings {
                line.push_str(&format!("\n       warning: {warning}"));
            }
            line
        }
        Outcome::Failed {
            failure: EntryFailure::Inconsistent(e),
        } => format!(
            "[{}] {status:<12} !! INCONSISTENT STATE, fix by hand: {e}",
            result.label
        ),
        Outcome::Failed {
            failure: EntryFailure::Step(e),
        } => format!("[{}] {status:<12} {original}: {e}", result.label),
        Outcome::SkippedNoOp => format!("[{}] {status:<12} {original}", result.label),
        Outcome::NotAttempted => {
            format!("[{}] {status:<12} {original} (not attempted)", result.label)
        }
    }
}

/// Closing summary for `apply`.
pub fn summary<W: Write>(w: &mut W, report: &BatchReport) -> io::Result<()> {
    writeln!(
        w,
        "\n{} applied, {} failed, {} skipped{}",
        report.applied(),
        report.failed(),
        report.skipped(),
        if report.cancelled {
            format!(", {} not attempted (cancelled)", report.not_attempted())
        } else {
            String::new()
        }
    )?;

    let inconsistent = report.inconsistent();
    if !inconsistent.is_empty() {
        writeln!(
            w,
            "\n!! {} file(s) no longer match the project and need manual recovery:",
            inconsistent.len()
        )?;
        for e in inconsistent {
            writeln!(
                w,
                "!!   file is at {}, project points at {}",
                e.target.display(),
                e.original.display()
            )?;
        }
    }
    Ok(())
}

/// Applied renames whose relink was lost because the project could not be
/// written back. Returns how many files need relinking by hand.
pub fn unsaved_project<W: Write>(
    w: &mut W,
    project: &Path,
    error: &dyn std::fmt::Display,
    report: &BatchReport,
) -> io::Result<usize> {
    writeln!(
        w,
        "\n!! Project {} could not be saved: {error}",
        project.display()
    )?;

    let mut lost = 0;
    for result in &report.results {
        if let Outcome::Applied { path, .. } = &result.outcome {
            if *path != result.original {
                if lost == 0 {
                    writeln!(w, "!! These files were renamed and must be relinked by hand:")?;
                }
                writeln!(
                    w,
                    "!!   [{}] {} -> {}",
                    result.label,
                    result.original.display(),
                    path.display()
                )?;
                lost += 1;
            }
        }
    }
    Ok(lost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_core::{InconsistentStateError, MediaId, TransactionStepError};
    use std::path::PathBuf;

    fn result(outcome: Outcome) -> TransactionResult {
        TransactionResult {
            index: 3,
            label: "03".into(),
            media: MediaId::new(),
            original: PathBuf::from("/a/take.wav"),
            target: Some(PathBuf::from("/a/03-Intro.wav")),
            outcome,
        }
    }

    #[test]
    fn applied_line_lists_warnings() {
        let line = status_line(&result(Outcome::Applied {
            path: PathBuf::from("/a/03-Intro.wav"),
            warnings: vec!["clip locked".into()],
        }));
        assert!(line.starts_with("[03] Applied      /a/take.wav -> /a/03-Intro.wav"), "got: {line}");
        assert!(line.contains("warning: clip locked"));
    }

    #[test]
    fn failed_line_carries_reason() {
        let line = status_line(&result(Outcome::Failed {
            failure: EntryFailure::Step(TransactionStepError::Rename {
                from: PathBuf::from("/a/take.wav"),
                to: PathBuf::from("/a/03-Intro.wav"),
                message: "permission denied".into(),
            }),
        }));
        assert!(line.starts_with("[03] Failed"));
        assert!(line.ends_with("permission denied"));
    }

    #[test]
    fn inconsistent_line_is_loud() {
        let line = status_line(&result(Outcome::Failed {
            failure: EntryFailure::Inconsistent(InconsistentStateError {
                media: MediaId::new(),
                original: PathBuf::from("/a/take.wav"),
                target: PathBuf::from("/a/03-Intro.wav"),
                relink_error: "offline".into(),
                rollback_error: "busy".into(),
            }),
        }));
        assert!(line.contains("!! INCONSISTENT STATE"));
    }

    #[test]
    fn not_attempted_is_pending() {
        let line = status_line(&result(Outcome::NotAttempted));
        assert_eq!(line, "[03] Pending      /a/take.wav (not attempted)");
    }
}
