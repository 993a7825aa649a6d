// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A cancellation-aware unit of asynchronous, fallible work: a
//! [`Future<Result<V>>`][crate::Future] paired with a [`Cancellation`]
//! handle.

mod async_task;
mod cancellation;
mod combinators;

pub use cancellation::Cancellation;

use std::sync::Arc;

use crate::error::Error;
use crate::executor::Executor;
use crate::future::Future;
use crate::result::Result;
use crate::timeout::Timeout;

/// A cancellation-aware, fallible asynchronous computation.
///
/// A `Task<V>` is a [`Future<Result<V>>`][Future] plus a [`Cancellation`]
/// token. Most of its combinators (`map`, `and_then`, `recover`, ...) live
/// in [`mod@combinators`] as further `impl` blocks on this type;
/// [`Task::spawn`] (the constructor that actually races work against
/// cancellation) lives in `async_task`.
pub struct Task<V> {
    future: Future<Result<V>>,
    cancellation: Cancellation,
}

impl<V> Clone for Task<V> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
            cancellation: self.cancellation.clone(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Task<V> {
    /// A task that is already successfully complete.
    #[must_use]
    pub fn success(value: V) -> Self {
        Self {
            future: Future::filled(Ok(value)),
            cancellation: Cancellation::new_inert(),
        }
    }

    /// A task that is already complete with `error`.
    #[must_use]
    pub fn failure(error: Error) -> Self {
        Self {
            future: Future::filled(Err(error)),
            cancellation: Cancellation::new_inert(),
        }
    }

    /// Lifts a plain, infallible `Future<V>` into a `Task<V>` that never
    /// fails and cannot be meaningfully cancelled (there is no work on this
    /// side to interrupt; the source `Future` runs to completion
    /// regardless).
    #[must_use]
    pub fn from_future(executor: Arc<dyn Executor>, future: Future<V>) -> Self {
        let mapped = future.map(executor, Ok);
        Self {
            future: mapped,
            cancellation: Cancellation::new_inert(),
        }
    }

    /// Builds a task directly from a `Future<Result<V>>` and a matching
    /// `Cancellation` token, for callers that already have both (e.g. a
    /// custom executor integration).
    #[must_use]
    pub fn from_future_result(future: Future<Result<V>>, cancellation: Cancellation) -> Self {
        Self { future, cancellation }
    }

    /// The cancellation token for this task. Cloning a `Task` clones the
    /// same underlying token, so cancelling any clone cancels them all.
    #[must_use]
    pub fn cancellation(&self) -> Cancellation {
        self.cancellation.clone()
    }

    /// Returns the outcome if complete, without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<Result<V>> {
        self.future.peek()
    }

    /// Blocks the calling thread until complete or `timeout` elapses.
    pub fn wait(&self, timeout: Timeout) -> Option<Result<V>> {
        self.future.wait(timeout)
    }

    /// Registers `callback` to run on `executor` once the task completes,
    /// whether with success or failure.
    pub fn upon(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(Result<V>) + Send + 'static) {
        self.future.upon(executor, callback);
    }

    /// Registers `callback` to run on `executor` only if the task
    /// succeeds.
    pub fn upon_success(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(V) + Send + 'static) {
        self.future.upon(executor, move |result| {
            if let Ok(value) = result {
                callback(value);
            }
        });
    }

    /// Registers `callback` to run on `executor` only if the task fails.
    pub fn upon_failure(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(Error) + Send + 'static) {
        self.future.upon(executor, move |result| {
            if let Err(error) = result {
                callback(error);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ImmediateExecutor;

    fn immediate() -> Arc<dyn Executor> {
        Arc::new(ImmediateExecutor)
    }

    #[test]
    fn success_task_peeks_ok_immediately() {
        let task = Task::success(1);
        assert!(matches!(task.peek(), Some(Ok(1))));
    }

    #[test]
    fn failure_task_peeks_err_immediately() {
        let task: Task<i32> = Task::failure(Error::Cancelled);
        assert!(matches!(task.peek(), Some(Err(Error::Cancelled))));
    }

    #[test]
    fn upon_success_skips_on_failure() {
        let task: Task<i32> = Task::failure(Error::InvalidInput);
        task.upon_success(immediate(), |_| panic!("must not run"));
    }

    #[test]
    fn upon_failure_skips_on_success() {
        let task = Task::success(1);
        task.upon_failure(immediate(), |_| panic!("must not run"));
    }

    #[test]
    fn from_future_is_always_ok() {
        let (promise, future) = crate::Deferred::<i32>::new_pair();
        let task = Task::from_future(immediate(), future);
        promise.must_fill(5);
        assert!(matches!(task.peek(), Some(Ok(5))));
    }
}
