//! Queued log operations.
//!
//! Each mutation is a [`Task`] executed on the lane serving its category.
//! Whatever happens inside, the completion callback is called exactly once:
//! on the worker after the operation finished, or on the submitting thread
//! if the lane rejected it.

use linelog_concurrency::{panic_message, Task};
use linelog_core::{validate_entry, Category, Error, Result};
use linelog_storage::LineFile;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Completion callback of a mutating operation.
///
/// Receives `None` on success and the error otherwise.
pub type Completion = Box<dyn FnOnce(Option<Error>) + Send + 'static>;

/// Completion callback of a queued read.
pub type ReadCompletion = Box<dyn FnOnce(Result<Vec<String>>) + Send + 'static>;

/// Predicate deciding which entries survive a filter.
pub type Predicate = Box<dyn FnMut(&str) -> bool + Send + 'static>;

pub(crate) enum Mutation {
    Append(String),
    Filter(Predicate),
    Clear,
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Append(_) => "append",
            Mutation::Filter(_) => "filter",
            Mutation::Clear => "clear",
        }
    }

    fn apply(self, file: &LineFile) -> Result<()> {
        match self {
            Mutation::Append(entry) => {
                validate_entry(&entry)?;
                file.append(&entry)
            }
            Mutation::Filter(mut predicate) => {
                let removed = panic::catch_unwind(AssertUnwindSafe(|| file.retain(&mut predicate)))
                    .unwrap_or_else(|payload| {
                        Err(Error::Internal(format!(
                            "filter predicate panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    })?;
                debug!(path = %file.path().display(), removed, "filtered entries");
                Ok(())
            }
            Mutation::Clear => file.remove().map(drop),
        }
    }
}

/// One append / filter / clear bound to its file and callback.
pub(crate) struct LogOp {
    category: Category,
    file: LineFile,
    mutation: Mutation,
    on_complete: Completion,
}

impl LogOp {
    pub(crate) fn new(
        category: Category,
        file: LineFile,
        mutation: Mutation,
        on_complete: Completion,
    ) -> Self {
        Self {
            category,
            file,
            mutation,
            on_complete,
        }
    }
}

impl Task for LogOp {
    fn run(self: Box<Self>) {
        let LogOp {
            category,
            file,
            mutation,
            on_complete,
        } = *self;

        let op = mutation.name();
        let result = mutation.apply(&file);
        match &result {
            Ok(()) => debug!(category = %category, op, "log operation completed"),
            Err(e) if e.is_invalid_input() => debug!(
                category = %category,
                op,
                code = e.error_code(),
                error = %e,
                "log operation refused"
            ),
            Err(e) => warn!(
                category = %category,
                op,
                code = e.error_code(),
                io_kind = ?e.io_kind(),
                error = %e,
                "log operation failed"
            ),
        }
        on_complete(result.err());
    }

    fn reject(self: Box<Self>, reason: Error) {
        (self.on_complete)(Some(reason));
    }
}

/// Read routed through the lane, ordered after earlier mutations.
pub(crate) struct ReadOp {
    file: LineFile,
    on_complete: ReadCompletion,
}

impl ReadOp {
    pub(crate) fn new(file: LineFile, on_complete: ReadCompletion) -> Self {
        Self { file, on_complete }
    }
}

impl Task for ReadOp {
    fn run(self: Box<Self>) {
        let ReadOp { file, on_complete } = *self;
        on_complete(file.read_entries());
    }

    fn reject(self: Box<Self>, reason: Error) {
        (self.on_complete)(Err(reason));
    }
}
