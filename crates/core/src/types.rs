//! Core types for linelog
//!
//! - [`Category`]: name of a log, resolved to exactly one file in the
//!   storage directory
//! - [`validate_entry`]: checks that an entry can be stored as one line

use crate::error::{Error, Result};
use std::fmt;

/// Maximum length of a category name in bytes
///
/// Matches the common filesystem limit for a single path component.
pub const MAX_CATEGORY_LEN: usize = 255;

/// Name of a log
///
/// A category names a single flat file inside the storage directory, so it
/// must be usable as one path component:
/// - non-empty and at most [`MAX_CATEGORY_LEN`] bytes
/// - not `.` or `..`
/// - no `/`, `\` or NUL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// Validate and wrap a category name
    ///
    /// # Examples
    ///
    /// ```
    /// use linelog_core::Category;
    ///
    /// let category = Category::new("errors").unwrap();
    /// assert_eq!(category.as_str(), "errors");
    /// assert!(Category::new("../errors").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.len() > MAX_CATEGORY_LEN {
            Some("longer than 255 bytes")
        } else if name == "." || name == ".." {
            Some("reserved directory name")
        } else if name.contains(['/', '\\']) {
            Some("contains a path separator")
        } else if name.contains('\0') {
            Some("contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidCategory { name, reason }),
            None => Ok(Category(name)),
        }
    }

    /// Borrow the name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned name
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Category {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Category::new(value)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Category::new(value)
    }
}

/// Check that `entry` can be stored as a single line
///
/// The newline is reserved as the separator, and an empty entry cannot be
/// told apart from an empty log once written.
pub fn validate_entry(entry: &str) -> Result<()> {
    if entry.is_empty() {
        return Err(Error::InvalidEntry("entry must not be empty".into()));
    }
    if let Some(pos) = entry.find('\n') {
        return Err(Error::InvalidEntry(format!(
            "entry contains a newline at byte {}",
            pos
        )));
    }
    Ok(())
}
