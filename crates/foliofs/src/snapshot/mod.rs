//! Streaming snapshot format.
//!
//! A snapshot is newline-delimited JSON with one [`NodeRecord`] per line.
//! Binary payloads at any depth are written as self-describing `__blob__`
//! envelopes, so a snapshot is plain text.

mod dump;
mod record;
mod restore;

pub use dump::{DUMP_PAGE_SIZE, DumpStats, dump, dump_to_writer};
pub use record::NodeRecord;
pub use restore::{
    DEFAULT_BATCH_SIZE, LineSplitter, RestoreOptions, RestoreStats, SnapshotSource, restore,
};
