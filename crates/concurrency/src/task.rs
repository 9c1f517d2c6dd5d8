//! Units of work executed by a lane

use linelog_core::Error;

/// Work submitted to a [`SerialLane`](crate::SerialLane)
///
/// Exactly one of `run` or `reject` is called for every submitted task.
/// `run` executes on the lane's worker thread. `reject` executes on the
/// submitting thread, before `submit` returns, when the task could not be
/// queued.
pub trait Task: Send + 'static {
    /// Execute the task on the worker
    fn run(self: Box<Self>);

    /// The task will never run
    fn reject(self: Box<Self>, reason: Error);
}

/// Task built from a pair of closures
pub struct Job<R, J> {
    run: R,
    reject: J,
}

impl<R, J> Job<R, J>
where
    R: FnOnce() + Send + 'static,
    J: FnOnce(Error) + Send + 'static,
{
    /// Create a job from its run and reject paths
    pub fn new(run: R, reject: J) -> Self {
        Self { run, reject }
    }

    /// Box the job for submission
    pub fn boxed(self) -> Box<dyn Task> {
        Box::new(self)
    }
}

impl<R, J> Task for Job<R, J>
where
    R: FnOnce() + Send + 'static,
    J: FnOnce(Error) + Send + 'static,
{
    fn run(self: Box<Self>) {
        let Job { run, .. } = *self;
        run()
    }

    fn reject(self: Box<Self>, reason: Error) {
        let Job { reject, .. } = *self;
        reject(reason)
    }
}
