//! reelname - batch rename and relink audio media used on an editing timeline
//!
//! This library crate exposes the pieces of the command-line tool (config
//! loading, track selection, base name sources, terminal output and batch
//! exit status) for integration testing. The engine itself lives in `rn-engine`.

pub mod config;
pub mod exit;
pub mod names;
pub mod render;
pub mod tracks;

pub use tracks::TrackSpec;
