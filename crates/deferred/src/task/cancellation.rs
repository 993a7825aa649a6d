// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;

use crate::atomic::AtomicFlag;

struct Gate {
    flag: AtomicFlag,
    on_cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// Either a task's own cancellation gate, or a forwarding link to whichever
/// downstream task currently represents "the work," for combinators
/// (`and_then`, `fallback`, `repeat`) that chain one task into another.
enum Kind {
    Gate(Gate),
    /// Starts pointing at the upstream task's token; `retarget` swaps it to
    /// point at a downstream task's token once one exists, so a caller who
    /// holds this handle before the downstream task is built still reaches
    /// it after.
    Forwarding(Mutex<Cancellation>),
}

/// A handle letting a caller request early termination of a [`Task`][crate::Task].
///
/// For a task built with [`Task::spawn`][crate::Task::spawn], cancellation
/// and the task's own work race for a single atomic gate: only one of
/// "cancel wins" or "work wins" ever happens, so `on_cancel` and the task's
/// closure can never both run, and never run concurrently. For a task
/// produced by chaining combinators, cancellation forwards to whichever
/// stage is currently running.
#[derive(Clone)]
pub struct Cancellation {
    inner: Arc<Kind>,
}

impl Cancellation {
    /// Creates a live cancellation token: `on_cancel` runs the first time
    /// [`cancel`][Self::cancel] wins the gate race.
    pub(crate) fn new_armed(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Kind::Gate(Gate {
                flag: AtomicFlag::new(false),
                on_cancel: Mutex::new(Some(Box::new(on_cancel))),
            })),
        }
    }

    /// Creates a token for a task that has no meaningful cancellation (it is
    /// already complete, or was built from a plain `Future` with no work to
    /// interrupt). The gate starts already claimed, so `cancel` is a no-op.
    pub(crate) fn new_inert() -> Self {
        Self {
            inner: Arc::new(Kind::Gate(Gate {
                flag: AtomicFlag::new(true),
                on_cancel: Mutex::new(None),
            })),
        }
    }

    /// Creates a token that initially forwards to `target`, and can later be
    /// re-pointed at a different target via [`retarget`][Self::retarget].
    pub(crate) fn new_forwarding(target: Cancellation) -> Self {
        Self {
            inner: Arc::new(Kind::Forwarding(Mutex::new(target))),
        }
    }

    /// Re-points a forwarding token at a new target. No-op on a `Gate`
    /// token (there is nothing to forward).
    pub(crate) fn retarget(&self, target: Cancellation) {
        if let Kind::Forwarding(current) = &*self.inner {
            *current.lock() = target;
        }
    }

    /// Claims the gate for the task's own work, racing against `cancel`.
    /// Returns `true` if this call claimed it (meaning the work should
    /// proceed); `false` means cancellation already won.
    pub(crate) fn claim(&self) -> bool {
        match &*self.inner {
            Kind::Gate(gate) => gate
                .flag
                .compare_and_swap(false, true, Ordering::AcqRel, Ordering::Acquire),
            Kind::Forwarding(target) => target.lock().claim(),
        }
    }

    /// Requests cancellation. Returns `true` if this call won the race
    /// (running `on_cancel`), `false` if the task's work had already
    /// claimed the gate (or a prior `cancel` already won it).
    pub fn cancel(&self) -> bool {
        match &*self.inner {
            Kind::Gate(gate) => {
                if gate
                    .flag
                    .compare_and_swap(false, true, Ordering::AcqRel, Ordering::Acquire)
                {
                    if let Some(on_cancel) = gate.on_cancel.lock().take() {
                        on_cancel();
                    }
                    true
                } else {
                    false
                }
            }
            Kind::Forwarding(target) => target.lock().cancel(),
        }
    }

    /// Returns whether the gate has been claimed, by either `cancel` or the
    /// task's own work.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match &*self.inner {
            Kind::Gate(gate) => gate.flag.load(Ordering::Acquire),
            Kind::Forwarding(target) => target.lock().is_cancelled(),
        }
    }
}
