//! Closing a batch: write the project back, print the summary and pick the
//! process exit status.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use rn_engine::{BatchReport, Outcome};

use crate::render;

/// Exit status when at least one entry failed or the batch was cancelled.
pub const EXIT_FAILED: u8 = 1;
/// Exit status when a file and the project no longer agree.
pub const EXIT_INCONSISTENT: u8 = 2;

/// Exit status for a finished batch. `project_saved` is false when the
/// relinks never reached the project file.
pub fn exit_status(report: &BatchReport, project_saved: bool) -> u8 {
    if !report.inconsistent().is_empty() || (!project_saved && has_relinks(report)) {
        EXIT_INCONSISTENT
    } else if report.failed() > 0 || report.cancelled || !project_saved {
        EXIT_FAILED
    } else {
        0
    }
}

fn has_relinks(report: &BatchReport) -> bool {
    report.results.iter().any(|r| {
        matches!(&r.outcome, Outcome::Applied { path, .. } if *path != r.original)
    })
}

/// Save the project, then print the summary. A failed save is reported
/// loudly with every file that lost its link, and never stops the summary.
pub fn conclude<W, E>(
    w: &mut W,
    report: &BatchReport,
    project: &Path,
    save: impl FnOnce() -> Result<(), E>,
) -> io::Result<u8>
where
    W: Write,
    E: fmt::Display,
{
    let saved = match save() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                "Failed to save project {}: {e}; renamed files are no longer linked",
                project.display()
            );
            for result in &report.results {
                if let Outcome::Applied { path, .. } = &result.outcome {
                    if *path != result.original {
                        tracing::error!(
                            "[{}] relink by hand: {} -> {}",
                            result.label,
                            result.original.display(),
                            path.display()
                        );
                    }
                }
            }
            render::unsaved_project(w, project, &e, report)?;
            false
        }
    };

    render::summary(w, report)?;
    Ok(exit_status(report, saved))
}
