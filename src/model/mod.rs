//! Document model for collected snapshots
//!
//! Everything persisted to disk is a [`Record`]: an ordered JSON object.
//! The typed structs here exist only to build those records in a fixed
//! key order.

mod playlist;
mod recommendation;
mod record;
mod track;

pub use playlist::{PlaylistSnapshot, PlaylistSummary};
pub use recommendation::{parse_target, RecommendationRequest, MAX_SEEDS, SEED_GENRES};
pub use record::{display_value, to_record, Record};
pub use track::{ArtistRef, PlaylistItem, TrackEntry, TrackObject, UserRef};
