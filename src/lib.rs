//! repomirror: Concurrent Repository Tree Mirroring
//!
//! Mirrors a remote repository, exposed through a contents-listing HTTP API, into a
//! local staging directory and computes a content digest for every mirrored file.
//! Sibling entries are fetched concurrently and the first failure aborts the run.

pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod mirror;
pub mod report;
pub mod run;
pub mod session;
pub mod tree;

pub use error::{MirrorError, Result};
