//! Sync mode for log mutations.
//!
//! Defines when written bytes are forced to disk.

/// Sync mode for log mutations.
///
/// Controls whether a mutation is fsynced before its completion callback
/// runs.
///
/// # Mode Comparison
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|------------------|
/// | Buffered | Never (OS decides) | Whatever the OS has not flushed |
/// | Strict | After every mutation | Zero once the callback has run |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Leave flushing to the operating system.
    ///
    /// A crash of the process loses nothing; a crash of the machine may
    /// lose recently completed mutations.
    #[default]
    Buffered,

    /// fsync after every append and rewrite.
    ///
    /// Use for logs that must survive power loss, such as crash reports.
    Strict,
}

impl SyncMode {
    /// Check if every mutation must be synced before completing.
    pub fn requires_fsync(&self) -> bool {
        matches!(self, SyncMode::Strict)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            SyncMode::Buffered => "Buffered (OS flushes, fastest)",
            SyncMode::Strict => "Strict (fsync every mutation)",
        }
    }

    /// Parse a mode name as used in configuration (`buffered` or `strict`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buffered" => Some(SyncMode::Buffered),
            "strict" => Some(SyncMode::Strict),
            _ => None,
        }
    }
}
