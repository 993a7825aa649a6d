// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`Task::spawn`]: the constructor that actually runs work on an
//! [`Executor`], racing it against cancellation through a single-consumer
//! gate (see [`Cancellation`]).

use std::sync::Arc;

use tracing::trace;

use super::{Cancellation, Task};
use crate::Deferred;
use crate::error::Error;
use crate::executor::Executor;
use crate::result::Result;

impl<V: Clone + Send + Sync + 'static> Task<V> {
    /// Submits `work` to `executor`, returning a `Task` that completes with
    /// `work`'s result.
    ///
    /// If [`Cancellation::cancel`] wins the race against `work` actually
    /// starting, `work` never runs: `on_cancel` runs instead, and the task
    /// completes with [`Error::Cancelled`]. If `work` wins the race, it
    /// always runs to completion; cancellation requested after that point
    /// is a no-op, matching the "best-effort" contract queued-job
    /// cancellation already has on [`Executor`].
    pub fn spawn(
        executor: Arc<dyn Executor>,
        on_cancel: impl FnOnce() + Send + 'static,
        work: impl FnOnce() -> Result<V> + Send + 'static,
    ) -> Self {
        let (promise, future) = Deferred::<Result<V>>::new_pair();

        let cancel_promise = promise.clone();
        let cancellation = Cancellation::new_armed(move || {
            trace!("task cancelled before work started");
            drop(cancel_promise.try_fill(Err(Error::Cancelled)));
            on_cancel();
        });

        let gate = cancellation.clone();
        executor.submit(Box::new(move || {
            if gate.claim() {
                let result = work();
                drop(promise.try_fill(result));
            }
        }));

        Self::from_future_result(future, cancellation)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::executor::ImmediateExecutor;
    use crate::timeout::Timeout;

    fn immediate() -> Arc<dyn Executor> {
        Arc::new(ImmediateExecutor)
    }

    // S4.
    #[test]
    fn spawned_work_completes_successfully() {
        let task = Task::spawn(immediate(), || panic!("must not run"), || Ok(7));
        assert!(matches!(task.peek(), Some(Ok(7))));
    }

    // S5: cancel before the executor drains the queue.
    #[test]
    fn cancelling_before_work_starts_skips_the_work() {
        let executor = crate::executor::SerialExecutor::new();
        let executor: Arc<dyn Executor> = Arc::new(executor);
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);
        let cancelled = Arc::new(AtomicUsize::new(0));
        let cancelled_clone = Arc::clone(&cancelled);

        let task: Task<i32> = Task::spawn(
            executor,
            move || {
                cancelled_clone.fetch_add(1, Ordering::AcqRel);
            },
            move || {
                ran_clone.fetch_add(1, Ordering::AcqRel);
                Ok(1)
            },
        );

        let cancellation = task.cancellation();
        assert!(cancellation.cancel());

        assert!(matches!(task.wait(Timeout::Bounded(Duration::from_millis(200))), Some(Err(Error::Cancelled))));
        assert_eq!(ran.load(Ordering::Acquire), 0);
        assert_eq!(cancelled.load(Ordering::Acquire), 1);
    }

    #[test]
    fn cancelling_after_completion_has_no_effect() {
        let task: Task<i32> = Task::spawn(immediate(), || panic!("must not run"), || Ok(1));
        assert!(!task.cancellation().cancel());
        assert!(matches!(task.peek(), Some(Ok(1))));
    }
}
