// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compositional operators over [`Future`]: `map`, `and_then`, `and`,
//! `all`, `first`, `ignore`, `every`.

use std::sync::Arc;

use crate::Deferred;
use crate::executor::Executor;
use crate::future::Future;

impl<V: Clone + Send + Sync + 'static> Future<V> {
    /// Schedules `f(v)` on `executor` once filled with `v`, and fills the
    /// returned `Future` with `f`'s return value.
    pub fn map<R, F>(&self, executor: Arc<dyn Executor>, f: F) -> Future<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> R + Send + 'static,
    {
        let (promise, future) = Deferred::new_pair();

        self.upon(executor, move |v| {
            promise.must_fill(f(v));
        });

        future
    }

    /// Like [`map`][Self::map], but `f` returns a `Future<R>` whose eventual
    /// value becomes the result (monadic bind).
    pub fn and_then<R, F>(&self, executor: Arc<dyn Executor>, f: F) -> Future<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(V) -> Future<R> + Send + 'static,
    {
        let (promise, future) = Deferred::new_pair();

        self.upon(executor.clone(), move |v| {
            let inner_future = f(v);
            inner_future.upon(executor, move |r| {
                promise.must_fill(r);
            });
        });

        future
    }

    /// Fills with `(v1, v2)` once both `self` and `other` are filled. No
    /// ordering is guaranteed between the two fills.
    pub fn and<W>(&self, executor: Arc<dyn Executor>, other: &Future<W>) -> Future<(V, W)>
    where
        W: Clone + Send + Sync + 'static,
    {
        Future::all2(executor, self.clone(), other.clone())
    }

    /// A `Future<Void>` fulfilled when `self` is, discarding the value.
    pub fn ignore(&self, executor: Arc<dyn Executor>) -> Future<()> {
        self.map(executor, |_| ())
    }

    /// A view — not a new cell — whose `upon` re-invokes `f` per
    /// subscriber rather than once for the whole chain, unlike `map`. Use
    /// when `f` is cheap and an extra cell would be wasteful.
    #[must_use]
    pub fn every<R, F>(&self, f: F) -> Every<V, F>
    where
        F: Fn(V) -> R + Clone + Send + Sync + 'static,
    {
        Every {
            source: self.clone(),
            f,
        }
    }

    fn all2<W>(executor: Arc<dyn Executor>, a: Future<V>, b: Future<W>) -> Future<(V, W)>
    where
        W: Clone + Send + Sync + 'static,
    {
        use std::sync::Mutex;

        let (promise, future) = Deferred::new_pair();
        let promise = Arc::new(Mutex::new(Some(promise)));
        let slots: Arc<Mutex<(Option<V>, Option<W>)>> = Arc::new(Mutex::new((None, None)));

        let complete = {
            let slots = Arc::clone(&slots);
            let promise = Arc::clone(&promise);
            move || {
                let mut guard = slots.lock().expect("lock poisoned");
                if let (Some(v), Some(w)) = (guard.0.take(), guard.1.take())
                    && let Some(p) = promise.lock().expect("lock poisoned").take()
                {
                    p.must_fill((v, w));
                }
            }
        };

        {
            let slots = Arc::clone(&slots);
            let complete = complete.clone();
            a.upon(Arc::clone(&executor), move |v| {
                slots.lock().expect("lock poisoned").0 = Some(v);
                complete();
            });
        }
        {
            let complete = complete.clone();
            b.upon(executor, move |w| {
                slots.lock().expect("lock poisoned").1 = Some(w);
                complete();
            });
        }

        future
    }
}

impl<V: Clone + Send + Sync + 'static> Future<V> {
    /// Fills with a vector of every input's value, in input order, once
    /// every one of `sources` is filled. An empty `sources` fills
    /// immediately with an empty vector.
    #[must_use]
    pub fn all(executor: Arc<dyn Executor>, sources: Vec<Future<V>>) -> Future<Vec<V>> {
        use std::sync::Mutex;

        if sources.is_empty() {
            return Future::filled(Vec::new());
        }

        let total = sources.len();
        let (promise, future) = Deferred::new_pair();
        let promise = Arc::new(Mutex::new(Some(promise)));
        let results: Arc<Mutex<Vec<Option<V>>>> = Arc::new(Mutex::new(vec![None; total]));
        let remaining = Arc::new(std::sync::atomic::AtomicUsize::new(total));

        for (index, source) in sources.into_iter().enumerate() {
            let results = Arc::clone(&results);
            let remaining = Arc::clone(&remaining);
            let promise = Arc::clone(&promise);

            source.upon(Arc::clone(&executor), move |v| {
                results.lock().expect("lock poisoned")[index] = Some(v);

                if remaining.fetch_sub(1, std::sync::atomic::Ordering::AcqRel) == 1
                    && let Some(p) = promise.lock().expect("lock poisoned").take()
                {
                    let collected = results
                        .lock()
                        .expect("lock poisoned")
                        .iter()
                        .cloned()
                        .map(|v| v.expect("every slot filled once remaining reaches zero"))
                        .collect();
                    p.must_fill(collected);
                }
            });
        }

        future
    }

    /// Fills with the value of whichever of `sources` fills first;
    /// subsequent fills from the other sources are ignored. Ties are
    /// broken by whichever fill's CAS against the result cell lands first.
    #[must_use]
    pub fn first(executor: Arc<dyn Executor>, sources: Vec<Future<V>>) -> Future<V> {
        let (promise, future) = Deferred::new_pair();
        let promise = Arc::new(promise);

        for source in sources {
            let promise = Arc::clone(&promise);
            source.upon(Arc::clone(&executor), move |v| {
                drop(promise.try_fill(v));
            });
        }

        future
    }
}

/// A view onto a [`Future<V>`] that re-invokes a transform `f` once per
/// subscriber, rather than once for the whole chain.
///
/// Produced by [`Future::every`].
#[derive(Clone)]
pub struct Every<V, F> {
    source: Future<V>,
    f: F,
}

impl<V, R, F> Every<V, F>
where
    V: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(V) -> R + Clone + Send + Sync + 'static,
{
    /// Registers a subscriber: when the source fills with `v`, `f(v)` runs
    /// fresh for this particular subscriber, then `g` receives the result.
    pub fn upon(&self, executor: Arc<dyn Executor>, g: impl FnOnce(R) + Send + 'static) {
        let f = self.f.clone();
        self.source.upon(executor, move |v| g(f(v)));
    }
}
