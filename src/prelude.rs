//! Convenient imports for linelog.
//!
//! ```ignore
//! use linelog::prelude::*;
//!
//! let logs = LineLogs::open("./logs")?;
//! logs.log("errors")?.append("disk full");
//! ```

// Main entry point
pub use crate::logs::{LineLogs, LineLogsBuilder};
pub use crate::log::LineLog;

// Error handling
pub use crate::{Error, Result};

// Configuration
pub use crate::config::LogConfig;
pub use crate::{LanePolicy, SyncMode};

// Core types
pub use crate::Category;
