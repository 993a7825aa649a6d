// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed atomic primitives with explicit memory orderings.
//!
//! Every other component in this crate expresses its ordering requirements
//! in terms of these three cells, rather than reaching for
//! `std::sync::atomic` directly at every call site.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A single-bit flag that can be loaded, stored, and compare-and-swapped
/// with an explicit [`Ordering`].
///
/// Used as the single-consumer gate between a [`Task`][crate::Task]'s
/// cancellation and the start of its work (see
/// [`Task::spawn`][crate::Task::spawn]).
#[derive(Debug, Default)]
pub struct AtomicFlag(AtomicBool);

impl AtomicFlag {
    /// Creates a new flag with the given initial value.
    #[must_use]
    pub const fn new(initial: bool) -> Self {
        Self(AtomicBool::new(initial))
    }

    /// Loads the current value.
    pub fn load(&self, order: Ordering) -> bool {
        self.0.load(order)
    }

    /// Stores a new value unconditionally.
    pub fn store(&self, value: bool, order: Ordering) {
        self.0.store(value, order);
    }

    /// Stores a new value and returns the previous one.
    pub fn exchange(&self, value: bool, order: Ordering) -> bool {
        self.0.swap(value, order)
    }

    /// Compare-and-swaps the flag from `current` to `new`, returning whether
    /// it succeeded. On failure, no exchange took place.
    pub fn compare_and_swap(
        &self,
        current: bool,
        new: bool,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        self.0
            .compare_exchange(current, new, success, failure)
            .is_ok()
    }
}

/// A counter used for reference-counting bookkeeping, such as tracking how
/// many [`Promise`][crate::Promise] handles remain outstanding for a given
/// [`Deferred`][crate::Deferred].
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicUsize);

impl AtomicCounter {
    /// Creates a counter starting at `initial`.
    #[must_use]
    pub const fn new(initial: usize) -> Self {
        Self(AtomicUsize::new(initial))
    }

    /// Loads the current value.
    pub fn load(&self, order: Ordering) -> usize {
        self.0.load(order)
    }

    /// Adds `delta` to the counter, returning the previous value.
    pub fn fetch_add(&self, delta: usize, order: Ordering) -> usize {
        self.0.fetch_add(delta, order)
    }

    /// Subtracts `delta` from the counter, returning the previous value.
    pub fn fetch_sub(&self, delta: usize, order: Ordering) -> usize {
        self.0.fetch_sub(delta, order)
    }
}
