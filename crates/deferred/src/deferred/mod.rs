// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The write-once cell at the core of this crate.
//!
//! Chooses the "wide shape" from the design notes universally: one
//! `Mutex`-guarded slot rather than distinguishing a pointer-width
//! fast path from a boxed-value path. This generalizes
//! [`oxidizer_rt`'s `once_event::shared`][once-event-shared]-style
//! `Mutex<EventState<T>>` (built for exactly one waiter and one
//! consumption) to the N-callback, N-observer cell this crate needs,
//! and replaces "panic on disconnected sender" with the milder
//! "never-determined" resolution this crate's contract calls for.
//!
//! [once-event-shared]: https://github.com/microsoft/oxidizer/tree/main/crates/oxidizer_rt

use std::mem;
use std::sync::{Arc, Condvar, Mutex};
use std::task::Waker;

use tracing::trace;

use crate::atomic::AtomicCounter;
use crate::executor::Executor;
use crate::timeout::{Deadline, Timeout};

type Job<V> = (Arc<dyn Executor>, Box<dyn FnOnce(V) + Send>);

/// The internal state of a cell: callbacks queued while empty, the value
/// once filled, or abandoned (every `Promise` dropped without filling).
enum SlotState<V> {
    /// Not yet filled; holds every callback registered so far, plus any
    /// `std::future::Future` wakers registered via `poll`. Wakers are kept
    /// separate from callbacks because abandonment must still wake a
    /// polling task (so it observes `Ready(None)`) even though it drops
    /// queued callbacks without invocation (invariant I4).
    Pending(Vec<Job<V>>, Vec<Waker>),
    /// Filled with `v`; immutable from here on (invariant I1).
    Filled(V),
    /// Every `Promise` was dropped while still empty. Waiters observe this
    /// as "no value, never will be"; queued callbacks are dropped without
    /// invocation (invariant I4).
    Abandoned,
}

pub(crate) struct Inner<V> {
    state: Mutex<SlotState<V>>,
    condvar: Condvar,
    promise_count: AtomicCounter,
}

impl<V> Inner<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending(Vec::new(), Vec::new())),
            condvar: Condvar::new(),
            // One `Promise` exists from the moment the pair is created.
            promise_count: AtomicCounter::new(1),
        }
    }
}

impl<V: Clone> Inner<V> {
    /// Fill protocol: release-publish `value` if still empty, draining and
    /// scheduling every queued callback. Returns `false` ("already-filled")
    /// if the cell was already `Filled` or `Abandoned`, in which case
    /// `value` is simply dropped.
    #[must_use]
    pub(crate) fn fill(&self, value: V) -> bool {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if !matches!(&*guard, SlotState::Pending(..)) {
            return false;
        }

        let previous = mem::replace(&mut *guard, SlotState::Filled(value.clone()));
        drop(guard);
        self.condvar.notify_all();
        trace!("filled a deferred cell");

        if let SlotState::Pending(jobs, wakers) = previous {
            for (executor, callback) in jobs {
                let v = value.clone();
                executor.submit(Box::new(move || callback(v)));
            }
            for waker in wakers {
                waker.wake();
            }
        }

        true
    }

    /// Peek protocol: returns the value if filled, `None` if still pending
    /// or abandoned. Never blocks.
    pub(crate) fn peek(&self) -> Option<V> {
        match &*self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner) {
            SlotState::Filled(v) => Some(v.clone()),
            SlotState::Pending(..) | SlotState::Abandoned => None,
        }
    }

    pub(crate) fn is_filled(&self) -> bool {
        matches!(
            &*self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner),
            SlotState::Filled(_)
        )
    }

    /// Wait protocol: blocks the caller thread until filled, abandoned, or
    /// `deadline` passes, whichever comes first.
    pub(crate) fn wait(&self, deadline: Deadline) -> Option<V> {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        loop {
            match &*guard {
                SlotState::Filled(v) => return Some(v.clone()),
                SlotState::Abandoned => return None,
                SlotState::Pending(..) => {}
            }

            match deadline {
                Deadline::Elapsed => return None,
                Deadline::Never => {
                    guard = self
                        .condvar
                        .wait(guard)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                }
                Deadline::At(instant) => {
                    let Some(remaining) = instant.checked_duration_since(std::time::Instant::now())
                    else {
                        return None;
                    };

                    let (next_guard, result) = self
                        .condvar
                        .wait_timeout(guard, remaining)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    guard = next_guard;

                    if result.timed_out() && !matches!(&*guard, SlotState::Filled(_) | SlotState::Abandoned) {
                        return None;
                    }
                }
            }
        }
    }

    /// Upon protocol: registers `(executor, callback)` if still pending
    /// (linearized against `fill`/`abandon` by the same mutex), otherwise
    /// submits immediately (if filled) or drops the callback silently (if
    /// abandoned).
    pub(crate) fn upon(&self, executor: Arc<dyn Executor>, callback: Box<dyn FnOnce(V) + Send>) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        match &mut *guard {
            SlotState::Filled(v) => {
                let v = v.clone();
                drop(guard);
                executor.submit(Box::new(move || callback(v)));
            }
            SlotState::Abandoned => {}
            SlotState::Pending(jobs, _) => jobs.push((executor, callback)),
        }
    }

    /// Poll protocol for `std::future::Future` integration: returns the
    /// value if already filled, `None` if abandoned, or registers `waker`
    /// to be woken on fill or abandonment and returns `Pending`.
    pub(crate) fn poll(&self, waker: &Waker) -> std::task::Poll<Option<V>> {
        use std::task::Poll;

        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        match &mut *guard {
            SlotState::Filled(v) => Poll::Ready(Some(v.clone())),
            SlotState::Abandoned => Poll::Ready(None),
            SlotState::Pending(_, wakers) => {
                wakers.push(waker.clone());
                Poll::Pending
            }
        }
    }

    /// Called when a `Promise` is cloned: one more producer may fill us.
    pub(crate) fn promise_cloned(&self) {
        self.promise_count
            .fetch_add(1, std::sync::atomic::Ordering::AcqRel);
    }

    /// Called when a `Promise` is dropped. If it was the last one and the
    /// cell is still pending, abandon it so waiters are released instead of
    /// hanging forever.
    pub(crate) fn promise_dropped(&self) {
        let previous = self
            .promise_count
            .fetch_sub(1, std::sync::atomic::Ordering::AcqRel);

        if previous != 1 {
            return;
        }

        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if let SlotState::Pending(_, wakers) = &mut *guard {
            // Dropping the job closures here is the "no invocation" half of
            // invariant I4; nothing observes the empty state. Wakers are
            // not callbacks in that sense, so they are still woken, to let
            // a polling `std::future::Future` observe `Ready(None)` instead
            // of hanging forever.
            let wakers = mem::take(wakers);
            *guard = SlotState::Abandoned;
            drop(guard);
            self.condvar.notify_all();
            trace!("abandoned a deferred cell: last promise dropped while still pending");
            for waker in wakers {
                waker.wake();
            }
        }
    }
}

/// A write-once value cell: the core primitive this crate provides.
///
/// Most callers obtain a [`Promise`]/[`Future`][crate::Future] pair via
/// [`Deferred::new_pair`] rather than using `Deferred` itself directly, but
/// the unsplit cell is exposed for cases (e.g. the `Task` algebra) that
/// want both read and write access in the same place.
pub struct Deferred<V> {
    pub(crate) inner: Arc<Inner<V>>,
}

impl<V> Clone for Deferred<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Deferred<V> {
    /// Creates a new, empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::new()),
        }
    }

    /// Creates a pre-filled cell.
    #[must_use]
    pub fn filled(value: V) -> Self {
        let cell = Self::new();
        assert!(cell.inner.fill(value), "a brand new cell is always empty");
        cell
    }

    pub(crate) fn from_inner(inner: Arc<Inner<V>>) -> Self {
        Self { inner }
    }

    /// Creates a fresh cell and immediately splits it into its write-only
    /// and read-only facets.
    #[must_use]
    pub fn new_pair() -> (crate::Promise<V>, crate::Future<V>) {
        let cell = Self::new();
        (
            crate::Promise::from_inner(Arc::clone(&cell.inner)),
            crate::Future::from_inner(cell.inner),
        )
    }

    /// Attempts to fill the cell. Returns `true` if this call was the one
    /// that filled it, `false` if it was already filled (or abandoned).
    pub fn try_fill(&self, value: V) -> bool {
        self.inner.fill(value)
    }

    /// Fills the cell, panicking if it was already filled.
    ///
    /// # Panics
    ///
    /// Panics if the cell was already filled or abandoned.
    pub fn must_fill(&self, value: V) {
        assert!(self.try_fill(value), "cell was already filled");
    }

    /// Returns the value if filled, without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<V> {
        self.inner.peek()
    }

    /// Returns whether the cell is currently filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.inner.is_filled()
    }

    /// Blocks the calling thread until filled or `timeout` elapses,
    /// returning `None` on timeout or abandonment.
    pub fn wait(&self, timeout: Timeout) -> Option<V> {
        self.inner.wait(timeout.into_deadline())
    }

    /// Registers `callback` to run on `executor` once filled. If already
    /// filled, submits immediately.
    pub fn upon(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(V) + Send + 'static) {
        self.inner.upon(executor, Box::new(callback));
    }
}

impl<V: Clone + Send + Sync + 'static> Default for Deferred<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn promise_cloned<V>(inner: &Inner<V>) {
    inner.promise_cloned();
}

pub(crate) fn promise_dropped<V>(inner: &Inner<V>) {
    inner.promise_dropped();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::executor::ImmediateExecutor;

    // S1: write-once.
    #[test]
    fn fill_then_peek_then_reject_second_fill() {
        let cell = Deferred::<i32>::new();

        assert!(cell.try_fill(42));
        assert_eq!(cell.peek(), Some(42));
        assert!(!cell.try_fill(7));
        assert_eq!(cell.peek(), Some(42));
    }

    // S2: 32 threads register upon, a 33rd fills; all run exactly once.
    #[test]
    fn upon_from_many_threads_runs_exactly_once_each() {
        let cell = Deferred::<i32>::new();
        let run_count = Arc::new(AtomicUsize::new(0));

        thread::scope(|scope| {
            for _ in 0..32 {
                let cell = cell.clone();
                let run_count = Arc::clone(&run_count);
                scope.spawn(move || {
                    cell.upon(Arc::new(ImmediateExecutor), move |v| {
                        assert_eq!(v, 42);
                        run_count.fetch_add(1, Ordering::AcqRel);
                    });
                });
            }

            thread::sleep(Duration::from_millis(20));
            scope.spawn(|| {
                cell.must_fill(42);
            });
        });

        assert_eq!(run_count.load(Ordering::Acquire), 32);
    }

    #[test]
    fn wait_respects_bounded_deadline() {
        let cell = Deferred::<i32>::new();
        let result = cell.wait(Timeout::Bounded(Duration::from_millis(20)));
        assert_eq!(result, None);
    }

    #[test]
    fn wait_unblocks_on_fill_from_other_thread() {
        let cell = Deferred::<i32>::new();
        let filler = cell.clone();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            filler.must_fill(99);
        });

        assert_eq!(cell.wait(Timeout::Unbounded), Some(99));
    }

    #[test]
    fn abandoning_last_promise_releases_waiters() {
        let (promise, future) = crate::Deferred::<i32>::new_pair();
        drop(promise);
        assert_eq!(future.peek(), None);
        assert_eq!(future.wait(Timeout::Immediate), None);
    }

    #[test]
    fn callback_on_destroyed_empty_cell_never_runs() {
        let (promise, future) = crate::Deferred::<i32>::new_pair();
        let invoked = Arc::new(AtomicUsize::new(0));
        let invoked_clone = Arc::clone(&invoked);

        future.upon(Arc::new(ImmediateExecutor), move |_| {
            invoked_clone.fetch_add(1, Ordering::AcqRel);
        });

        drop(promise);

        assert_eq!(invoked.load(Ordering::Acquire), 0);
    }
}
