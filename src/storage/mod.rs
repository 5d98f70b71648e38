//! Storage layer - conversation snapshots on disk.
//!
//! A snapshot is a JSON document `{model, messages}`. Files holding a bare
//! message array, as written by older builds, load as well.

mod snapshot;

pub use snapshot::Snapshot;
