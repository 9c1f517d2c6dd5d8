//! Storage layer for linelog
//!
//! This crate owns everything that touches the filesystem:
//! - LogDir: the storage directory, one flat file per category
//! - LineFile: synchronous read / append / rewrite / remove of one log file
//! - format: splitting and joining newline-separated entries
//! - SyncMode: whether mutations are fsynced before they complete
//!
//! Nothing here is synchronized. Callers serialize mutations of a file
//! themselves (see `linelog-concurrency`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dir;
pub mod durability;
pub mod format;
pub mod line_file;

pub use dir::LogDir;
pub use durability::SyncMode;
pub use format::{join_entries, split_entries, SEPARATOR};
pub use line_file::LineFile;
