// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::deferred::Inner;
use crate::executor::Executor;
use crate::timeout::Timeout;

/// A read-only handle to a [`Deferred`][crate::Deferred] cell.
///
/// Cloning a `Future` is cheap (an `Arc` clone) and every clone observes
/// the same eventual value — many `Future`s may point to the same cell.
pub struct Future<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Future<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Future<V> {
    pub(crate) fn from_inner(inner: Arc<Inner<V>>) -> Self {
        Self { inner }
    }
}

impl<V: Clone + Send + Sync + 'static> Future<V> {
    /// Creates an already-filled `Future`, with no corresponding `Promise`.
    #[must_use]
    pub fn filled(value: V) -> Self {
        let cell = crate::Deferred::filled(value);
        Self::from_inner(cell.inner)
    }

    /// Returns the value if filled, without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<V> {
        self.inner.peek()
    }

    /// Returns whether the underlying cell is currently filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.inner.is_filled()
    }

    /// Blocks the calling thread until filled or `timeout` elapses.
    pub fn wait(&self, timeout: Timeout) -> Option<V> {
        self.inner.wait(timeout.into_deadline())
    }

    /// Registers `callback` to run on `executor` once filled. If already
    /// filled, submits immediately. Has no effect if the cell was
    /// abandoned (every `Promise` dropped without filling).
    pub fn upon(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(V) + Send + 'static) {
        self.inner.upon(executor, Box::new(callback));
    }
}

/// `Future<V>` is itself `Unpin` (it is just an `Arc` handle), so it can be
/// polled directly without pinning machinery.
///
/// `Output` is `Option<V>` rather than `V` so that `.await`ing an abandoned
/// cell resolves to `None` instead of hanging forever, matching
/// [`wait`][Future::wait]'s contract.
impl<V: Clone + Send + Sync + 'static> std::future::Future for Future<V> {
    type Output = Option<V>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll(cx.waker())
    }
}
