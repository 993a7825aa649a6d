// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A type-erased [`Future`] for API boundaries that should not leak which
//! combinator chain (or raw [`Deferred`][crate::Deferred]) produced a value.

use std::sync::Arc;

use crate::executor::Executor;
use crate::future::Future;

trait Source<V>: Send + Sync {
    fn peek(&self) -> Option<V>;
    fn is_filled(&self) -> bool;
    fn upon(&self, executor: Arc<dyn Executor>, callback: Box<dyn FnOnce(V) + Send>);
}

impl<V: Clone + Send + Sync + 'static> Source<V> for Future<V> {
    fn peek(&self) -> Option<V> {
        Future::peek(self)
    }

    fn is_filled(&self) -> bool {
        Future::is_filled(self)
    }

    fn upon(&self, executor: Arc<dyn Executor>, callback: Box<dyn FnOnce(V) + Send>) {
        Future::upon(self, executor, callback);
    }
}

/// A [`Future<V>`] hidden behind a trait object, so a caller cannot observe
/// (or depend on) which concrete combinator chain produced it.
///
/// Construct with `AnyFuture::from` (or `.into()`) from any [`Future<V>`].
pub struct AnyFuture<V> {
    source: Arc<dyn Source<V>>,
}

impl<V> Clone for AnyFuture<V> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> From<Future<V>> for AnyFuture<V> {
    fn from(future: Future<V>) -> Self {
        Self {
            source: Arc::new(future),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> AnyFuture<V> {
    /// Returns the value if filled, without blocking.
    #[must_use]
    pub fn peek(&self) -> Option<V> {
        self.source.peek()
    }

    /// Returns whether the underlying cell is currently filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.source.is_filled()
    }

    /// Registers `callback` to run on `executor` once filled.
    pub fn upon(&self, executor: Arc<dyn Executor>, callback: impl FnOnce(V) + Send + 'static) {
        self.source.upon(executor, Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Deferred;
    use crate::executor::ImmediateExecutor;

    #[test]
    fn erases_the_concrete_future_type() {
        let (promise, future) = Deferred::<i32>::new_pair();
        let any: AnyFuture<i32> = future.into();

        assert_eq!(any.peek(), None);
        promise.must_fill(9);
        assert_eq!(any.peek(), Some(9));
    }

    #[test]
    fn upon_still_fires_through_the_wrapper() {
        let future = Future::filled(3);
        let any: AnyFuture<i32> = future.into();

        any.upon(Arc::new(ImmediateExecutor), |v| assert_eq!(v, 3));
    }
}
