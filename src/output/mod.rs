//! Output module for reporting on the record store
//!
//! This module handles:
//! - Rendering lookup results as plain text
//! - Summarizing database contents
//! - Packaging the database as a compressed snapshot and restoring it

mod render;
pub mod snapshot;
pub mod stats;

pub use render::{render_matches, render_outcome, render_record};
pub use snapshot::{export_snapshot, read_metadata, restore_snapshot, SnapshotMetadata};
pub use stats::{load_statistics, print_statistics, DatabaseStatistics};
