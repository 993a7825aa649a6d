// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Further [`Task`] combinators: `map`, `and_then`, `recover`, `fallback`,
//! `repeat`, `ignored`, and `and_success`.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use super::{Cancellation, Task};
use crate::Deferred;
use crate::error::Error;
use crate::executor::Executor;
use crate::result::{Result, try_result};

impl<V: Clone + Send + Sync + 'static> Task<V> {
    /// Transforms a successful value; a failure passes through unchanged.
    /// Shares the same cancellation token as `self` (no new work is
    /// spawned, just a transform on the eventual result). A panic inside
    /// `f` is caught and becomes a [`Error::Programming`] failure rather
    /// than unwinding through the executor.
    pub fn map<R, F>(&self, executor: Arc<dyn Executor>, f: F) -> Task<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> R + Send + 'static,
    {
        let mapped = self.future.map(executor, move |result| match result {
            Ok(value) => try_result(AssertUnwindSafe(move || Ok(f(value)))),
            Err(error) => Err(error),
        });
        Task::from_future_result(mapped, self.cancellation.clone())
    }

    /// Chains a successful value into a further task (monadic bind over
    /// `Result`); a failure passes through unchanged. Cancellation of the
    /// returned task forwards to `self` before `f` runs, and to `f`'s task
    /// afterwards.
    pub fn and_then<R, F>(&self, executor: Arc<dyn Executor>, f: F) -> Task<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> Task<R> + Send + 'static,
    {
        let (promise, future) = Deferred::<Result<R>>::new_pair();
        let cancellation = Cancellation::new_forwarding(self.cancellation.clone());
        let retarget = cancellation.clone();

        self.future.upon(executor.clone(), move |result| match result {
            Ok(value) => {
                let inner = f(value);
                retarget.retarget(inner.cancellation());
                inner.upon(executor, move |inner_result| {
                    drop(promise.try_fill(inner_result));
                });
            }
            Err(error) => drop(promise.try_fill(Err(error))),
        });

        Task::from_future_result(future, cancellation)
    }

    /// Turns a failure into a success by computing a fallback value;
    /// success passes through unchanged. A panic inside `f` is caught and
    /// becomes a [`Error::Programming`] failure rather than unwinding
    /// through the executor.
    pub fn recover<F>(&self, executor: Arc<dyn Executor>, f: F) -> Task<V>
    where
        F: FnOnce(Error) -> V + Send + 'static,
    {
        let mapped = self.future.map(executor, move |result| match result {
            Ok(value) => Ok(value),
            Err(error) => try_result(AssertUnwindSafe(move || Ok(f(error)))),
        });
        Task::from_future_result(mapped, self.cancellation.clone())
    }

    /// Turns a failure into a further task to attempt instead; success
    /// passes through unchanged. Cancellation forwards the same way
    /// [`and_then`][Self::and_then] does, but triggered on failure. A panic
    /// inside `f` is caught and becomes a [`Error::Programming`] failure
    /// rather than unwinding through the executor.
    pub fn fallback<F>(&self, executor: Arc<dyn Executor>, f: F) -> Task<V>
    where
        F: FnOnce(Error) -> Task<V> + Send + 'static,
    {
        let (promise, future) = Deferred::<Result<V>>::new_pair();
        let cancellation = Cancellation::new_forwarding(self.cancellation.clone());
        let retarget = cancellation.clone();

        self.future.upon(executor.clone(), move |result| match result {
            Ok(value) => drop(promise.try_fill(Ok(value))),
            Err(error) => match try_result(AssertUnwindSafe(move || Ok(f(error)))) {
                Ok(inner) => {
                    retarget.retarget(inner.cancellation());
                    inner.upon(executor, move |inner_result| {
                        drop(promise.try_fill(inner_result));
                    });
                }
                Err(panic_error) => drop(promise.try_fill(Err(panic_error))),
            },
        });

        Task::from_future_result(future, cancellation)
    }

    /// Discards a successful value; a failure passes through unchanged.
    #[must_use]
    pub fn ignored(&self, executor: Arc<dyn Executor>) -> Task<()> {
        self.map(executor, |_| ())
    }

    /// Runs every task in `tasks` concurrently and succeeds with every
    /// value, in input order, once all of them succeed. Fails as soon as
    /// any one of them does, with that task's error, cancelling every
    /// sibling that is still running. An empty `tasks` succeeds
    /// immediately with an empty vector.
    #[must_use]
    pub fn and_success(executor: Arc<dyn Executor>, tasks: Vec<Task<V>>) -> Task<Vec<V>> {
        if tasks.is_empty() {
            return Task::success(Vec::new());
        }

        let total = tasks.len();
        let (promise, future) = Deferred::<Result<Vec<V>>>::new_pair();
        let promise = Arc::new(promise);
        let results: Arc<Mutex<Vec<Option<V>>>> = Arc::new(Mutex::new(vec![None; total]));
        let remaining = Arc::new(AtomicUsize::new(total));
        let siblings: Vec<Cancellation> = tasks.iter().map(Task::cancellation).collect();

        for (index, task) in tasks.into_iter().enumerate() {
            let results = Arc::clone(&results);
            let remaining = Arc::clone(&remaining);
            let promise = Arc::clone(&promise);
            let siblings = siblings.clone();

            task.upon(Arc::clone(&executor), move |result| match result {
                Ok(value) => {
                    results.lock().expect("lock poisoned")[index] = Some(value);

                    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                        let collected = results
                            .lock()
                            .expect("lock poisoned")
                            .iter()
                            .cloned()
                            .map(|v| v.expect("every slot filled once remaining reaches zero"))
                            .collect();
                        drop(promise.try_fill(Ok(collected)));
                    }
                }
                Err(error) => {
                    drop(promise.try_fill(Err(error)));
                    for sibling in &siblings {
                        sibling.cancel();
                    }
                }
            });
        }

        let combined = Cancellation::new_armed(move || {
            for sibling in &siblings {
                sibling.cancel();
            }
        });

        Task::from_future_result(future, combined)
    }
}

struct RepeatState<V> {
    work: Box<dyn Fn() -> Task<V> + Send + Sync>,
    continuing_if: Box<dyn Fn(&Error) -> bool + Send + Sync>,
    promise: crate::Promise<Result<V>>,
    cancellation: Cancellation,
}

fn run_attempt<V: Clone + Send + Sync + 'static>(
    state: Arc<RepeatState<V>>,
    executor: Arc<dyn Executor>,
    remaining: usize,
) {
    let task = (state.work)();
    state.cancellation.retarget(task.cancellation());

    let state_for_callback = Arc::clone(&state);
    let executor_for_retry = Arc::clone(&executor);

    task.upon(executor, move |result| match result {
        Ok(value) => drop(state_for_callback.promise.try_fill(Ok(value))),
        Err(error) => {
            if remaining > 1 && (state_for_callback.continuing_if)(&error) {
                trace!(remaining = remaining - 1, "retrying after a failed attempt");
                run_attempt(state_for_callback, executor_for_retry, remaining - 1);
            } else {
                drop(state_for_callback.promise.try_fill(Err(error)));
            }
        }
    });
}

impl<V: Clone + Send + Sync + 'static> Task<V> {
    /// Invokes `work` up to `count + 1` times (the initial attempt plus up
    /// to `count` retries), stopping at the first success or the first
    /// failure `continuing_if` rejects; the last outcome becomes the
    /// task's result.
    ///
    /// `work` is called fresh for each attempt (it typically closes over a
    /// request or operation to repeat); `continuing_if` inspects a failed
    /// attempt's error and decides whether another attempt is worthwhile.
    /// Cancellation forwards to whichever attempt is currently running.
    #[must_use]
    pub fn repeat(
        executor: Arc<dyn Executor>,
        count: usize,
        continuing_if: impl Fn(&Error) -> bool + Send + Sync + 'static,
        work: impl Fn() -> Task<V> + Send + Sync + 'static,
    ) -> Task<V> {
        let (promise, future) = Deferred::<Result<V>>::new_pair();
        let cancellation = Cancellation::new_forwarding(Cancellation::new_inert());

        let state = Arc::new(RepeatState {
            work: Box::new(work),
            continuing_if: Box::new(continuing_if),
            promise,
            cancellation: cancellation.clone(),
        });

        run_attempt(state, executor, count + 1);

        Task::from_future_result(future, cancellation)
    }
}
