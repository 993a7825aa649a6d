// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! An abstract "submit a closure" sink, decoupling callback delivery from
//! any specific thread/queue implementation.

mod immediate;
mod queue;
mod serial;

pub use immediate::ImmediateExecutor;
pub use queue::QueueExecutor;
pub use serial::SerialExecutor;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A unit of work submitted to an [`Executor`], paired with a shared
/// "is-cancelled" flag the executor may consult before invoking it.
///
/// Executors are free to ignore the flag (running the job unconditionally)
/// or to skip jobs observed as cancelled before they were dequeued; either
/// behavior is conforming, since cancellation of queued work is always
/// best-effort.
pub struct CancellableJob {
    closure: Box<dyn FnOnce() + Send>,
    is_cancelled: Arc<AtomicBool>,
}

impl CancellableJob {
    /// Pairs `closure` with `is_cancelled`, a flag the job owner may set at
    /// any time from any thread to request that the job be skipped.
    pub fn new(is_cancelled: Arc<AtomicBool>, closure: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closure: Box::new(closure),
            is_cancelled,
        }
    }

    /// Runs the job unless it was marked cancelled before this call.
    pub fn run(self) {
        if !self.is_cancelled.load(Ordering::Acquire) {
            (self.closure)();
        }
    }
}

/// A polymorphic sink accepting closures for eventual execution.
///
/// `submit` must not run `job` before returning unless the implementation
/// is explicitly documented as immediate (see [`ImmediateExecutor`]).
/// Ordering between two submissions to the same executor is FIFO for
/// serial executors ([`SerialExecutor`], [`QueueExecutor`]) and unspecified
/// for concurrent ones.
pub trait Executor: Send + Sync {
    /// Enqueues `job` for eventual execution.
    fn submit(&self, job: Box<dyn FnOnce() + Send>);

    /// Enqueues a cancellable job. The default implementation simply
    /// forwards to [`Executor::submit`]; the cancellation check happens
    /// inside [`CancellableJob::run`] regardless of which `submit` method
    /// dispatched it.
    fn submit_cancellable(&self, job: CancellableJob) {
        self.submit(Box::new(move || job.run()));
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        (**self).submit(job);
    }

    fn submit_cancellable(&self, job: CancellableJob) {
        (**self).submit_cancellable(job);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::executor::ImmediateExecutor;

    #[test]
    fn cancellable_job_runs_when_not_cancelled() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let job = CancellableJob::new(Arc::new(AtomicBool::new(false)), move || {
            ran_clone.fetch_add(1, Ordering::AcqRel);
        });

        job.run();

        assert_eq!(ran.load(Ordering::Acquire), 1);
    }

    #[test]
    fn cancellable_job_skips_the_closure_when_cancelled_first() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let is_cancelled = Arc::new(AtomicBool::new(false));
        let job = CancellableJob::new(Arc::clone(&is_cancelled), move || {
            ran_clone.fetch_add(1, Ordering::AcqRel);
        });

        is_cancelled.store(true, Ordering::Release);
        job.run();

        assert_eq!(ran.load(Ordering::Acquire), 0);
    }

    #[test]
    fn submit_cancellable_default_forwards_through_submit() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let executor: Arc<dyn Executor> = Arc::new(ImmediateExecutor);

        executor.submit_cancellable(CancellableJob::new(Arc::new(AtomicBool::new(false)), move || {
            ran_clone.fetch_add(1, Ordering::AcqRel);
        }));

        assert_eq!(ran.load(Ordering::Acquire), 1);
    }

    #[test]
    fn submit_cancellable_skips_a_job_cancelled_before_dispatch() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let executor: Arc<dyn Executor> = Arc::new(ImmediateExecutor);
        let is_cancelled = Arc::new(AtomicBool::new(true));

        executor.submit_cancellable(CancellableJob::new(is_cancelled, move || {
            ran_clone.fetch_add(1, Ordering::AcqRel);
        }));

        assert_eq!(ran.load(Ordering::Acquire), 0);
    }
}
