//! Summary of a finished (or cancelled) batch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rn_core::{BatchId, InconsistentStateError};

use crate::transaction::{EntryStatus, Outcome, TransactionResult};

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch: BatchId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
    /// One result per plan entry, in plan order.
    pub results: Vec<TransactionResult>,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.count(EntryStatus::Applied)
    }

    pub fn failed(&self) -> usize {
        self.count(EntryStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(EntryStatus::SkippedNoOp)
    }

    pub fn not_attempted(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::NotAttempted)
            .count()
    }

    /// Applied entries that carry display-name warnings.
    pub fn warnings(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.outcome, Outcome::Applied { warnings, .. } if !warnings.is_empty()))
            .count()
    }

    /// Entries whose file and project no longer agree.
    pub fn inconsistent(&self) -> Vec<&InconsistentStateError> {
        self.results.iter().filter_map(|r| r.inconsistency()).collect()
    }

    /// Every attempted entry ended applied or skipped.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: EntryStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }
}
