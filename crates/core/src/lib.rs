//! Core types for linelog
//!
//! This crate defines the vocabulary shared by every other layer:
//! - [`Category`]: validated name of a log, one flat file per category
//! - [`validate_entry`]: the rules an entry must follow to be stored as a line
//! - [`Error`] / [`Result`]: the canonical error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{validate_entry, Category, MAX_CATEGORY_LEN};
