// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Read/write lock abstraction, injected into [`Protected`][crate::Protected]
//! so that tests can swap in a different locking policy.

/// A locking policy guarding a value of type `T`.
///
/// Implementations decide what "shared" and "exclusive" access mean; the
/// two provided here are a genuine multi-reader/single-writer lock
/// ([`ReaderWriterLock`]) and a binary semaphore where both operations are
/// exclusive ([`ExclusiveLock`]).
pub trait Locking<T>: Send + Sync {
    /// Wraps `value` in a freshly constructed lock.
    fn new(value: T) -> Self
    where
        Self: Sized;

    /// Executes `body` under a shared lock, passing the guarded value by
    /// reference.
    fn with_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> R;

    /// Executes `body` under an exclusive lock, passing the guarded value by
    /// mutable reference.
    fn with_write_lock<R>(&self, body: impl FnOnce(&mut T) -> R) -> R;

    /// Attempts to acquire the shared lock without blocking. Returns `None`
    /// if the lock could not be acquired immediately.
    fn try_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> Option<R>;
}

/// A genuine multi-reader/single-writer lock.
///
/// Backed by `parking_lot::RwLock`, whose eventually-fair scheduling is the
/// concrete writer-priority policy called for: a long-running stream of
/// readers cannot starve a waiting writer indefinitely.
#[derive(Debug)]
pub struct ReaderWriterLock<T>(parking_lot::RwLock<T>);

impl<T> Locking<T> for ReaderWriterLock<T>
where
    T: Send,
{
    fn new(value: T) -> Self {
        Self(parking_lot::RwLock::new(value))
    }

    fn with_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> R {
        body(&self.0.read())
    }

    fn with_write_lock<R>(&self, body: impl FnOnce(&mut T) -> R) -> R {
        body(&mut self.0.write())
    }

    fn try_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> Option<R> {
        self.0.try_read().map(|guard| body(&guard))
    }
}

/// A binary-semaphore lock: both shared and exclusive access serialize on
/// the same single permit.
///
/// Useful when `T`'s invariants make concurrent readers unsafe or
/// meaningless even though the API shape of [`Locking`] is reused.
#[derive(Debug)]
pub struct ExclusiveLock<T>(parking_lot::Mutex<T>);

impl<T> Locking<T> for ExclusiveLock<T>
where
    T: Send,
{
    fn new(value: T) -> Self {
        Self(parking_lot::Mutex::new(value))
    }

    fn with_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> R {
        body(&self.0.lock())
    }

    fn with_write_lock<R>(&self, body: impl FnOnce(&mut T) -> R) -> R {
        body(&mut self.0.lock())
    }

    fn try_read_lock<R>(&self, body: impl FnOnce(&T) -> R) -> Option<R> {
        self.0.try_lock().map(|guard| body(&guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_writer_lock_round_trips() {
        let lock = ReaderWriterLock::new(41);
        lock.with_write_lock(|v| *v += 1);
        assert_eq!(lock.with_read_lock(|v| *v), 42);
    }

    #[test]
    fn exclusive_lock_round_trips() {
        let lock = ExclusiveLock::new(41);
        lock.with_write_lock(|v| *v += 1);
        assert_eq!(lock.with_read_lock(|v| *v), 42);
        assert_eq!(lock.try_read_lock(|v| *v), Some(42));
    }
}
