//! rn-core: shared types, IDs, errors and configuration.
//!
//! This crate is the foundational dependency for the other rn-* crates,
//! providing type-safe identifiers for host objects, the error taxonomy of a
//! rename batch, timeline value types and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{
    Conflict, Error, InconsistentStateError, InventoryError, PlanError, Result,
    TransactionStepError,
};
pub use ids::*;
pub use media::*;
