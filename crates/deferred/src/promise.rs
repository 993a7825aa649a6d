// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::deferred::{self, Inner};

/// A write-only handle to a [`Deferred`][crate::Deferred] cell.
///
/// Typically there is one `Promise` per cell, but nothing prevents cloning
/// it and racing multiple fills from multiple producers — at most one
/// succeeds (invariant I1). When the last surviving `Promise` is dropped
/// without ever filling the cell, every [`Future`][crate::Future] observing
/// it is released with "never-determined" semantics rather than hanging
/// forever.
pub struct Promise<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Promise<V> {
    pub(crate) fn from_inner(inner: Arc<Inner<V>>) -> Self {
        Self { inner }
    }
}

impl<V> Clone for Promise<V> {
    fn clone(&self) -> Self {
        deferred::promise_cloned(&self.inner);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Drop for Promise<V> {
    fn drop(&mut self) {
        deferred::promise_dropped(&self.inner);
    }
}

impl<V: Clone + Send + Sync + 'static> Promise<V> {
    /// Attempts to fill the cell. Returns `true` if this call filled it,
    /// `false` if it was already filled by a racing `Promise`.
    pub fn try_fill(&self, value: V) -> bool {
        self.inner.fill(value)
    }

    /// Fills the cell, asserting no prior fill has occurred.
    ///
    /// Use this where the program's structure guarantees a single producer
    /// and a double fill would indicate a programming error.
    ///
    /// # Panics
    ///
    /// Panics if the cell was already filled.
    pub fn must_fill(&self, value: V) {
        assert!(self.try_fill(value), "cell was already filled by another Promise");
    }

    /// Returns whether the cell is currently filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.inner.is_filled()
    }
}
