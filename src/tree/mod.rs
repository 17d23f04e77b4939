//! Remote repository tree
//!
//! A repository is exposed as nested listings: each listing URL returns the
//! entries of one directory level, and each subdirectory is listed at
//! `<listing url>/<name>`. This module models those entries and walks them.

pub mod entry;
pub mod path;
pub mod walker;

pub use entry::{TreeEntry, UnknownEntryPolicy};
pub use walker::{TreeWalker, WalkOptions, WalkSummary};
