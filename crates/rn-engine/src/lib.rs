//! # rn-engine
//!
//! The rename/relink engine. Data flows strictly forward through four
//! stages:
//!
//! - **[`build_inventory`]** -- walk the selected tracks of a timeline and
//!   collect every clip occurrence in chronological order, resolving its
//!   backing media through the host's media identity.
//! - **[`deduplicate`]** -- group occurrences by media identity so that each
//!   underlying file appears once, in order of first use.
//! - **[`build_plan`]** -- turn user base names into validated
//!   `{index}-{base}.{ext}` targets. Pure: nothing is touched.
//! - **[`execute`]** -- apply the plan entry by entry (rename on disk, relink
//!   in the project, rename clips), yielding a [`TransactionResult`] per
//!   entry and rolling back the disk rename when the relink fails.

pub mod dedup;
pub mod inventory;
pub mod plan;
pub mod report;
pub mod transaction;

// Re-export key types at the crate root.
pub use dedup::{deduplicate, UniqueMedia};
pub use inventory::{
    build_inventory, ClipOccurrence, Inventory, MediaReference, Orphan, OrphanReason, Selection,
    TrackRef,
};
pub use plan::{build_plan, current_base, RenameAction, RenameEntry, RenamePlan};
pub use report::BatchReport;
pub use transaction::{
    execute, EntryFailure, EntryStatus, ExecuteOptions, Outcome, Transaction, TransactionResult,
};
