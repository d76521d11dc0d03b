//! On-disk snapshot storage
//!
//! Records are kept as pretty-printed JSON files grouped in one directory per
//! user. A record is only rewritten when it differs from what is on disk, and
//! every rewrite appends an entry to that directory's `changes.txt`.

pub mod diff;
pub mod directory;
pub mod sanitize;
pub mod snapshot;

pub use diff::diff;
pub use directory::{resolve_dir, TieBreak};
pub use sanitize::{sanitize, sanitize_with, DEFAULT_REPLACEMENT};
pub use snapshot::{SnapshotStore, StoreOutcome, CHANGELOG_FILE};
