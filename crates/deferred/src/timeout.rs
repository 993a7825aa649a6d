// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

/// A wait deadline, expressed relative to the moment it is converted to a
/// [`Deadline`] via [`Timeout::into_deadline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Do not wait at all; equivalent to a single non-blocking check.
    Immediate,

    /// Wait indefinitely.
    Unbounded,

    /// Wait for at most the given duration.
    Bounded(Duration),
}

impl Timeout {
    /// Converts this timeout to an absolute [`Deadline`] using the
    /// monotonic clock (`Instant::now`).
    #[must_use]
    pub fn into_deadline(self) -> Deadline {
        match self {
            Self::Immediate => Deadline::Elapsed,
            Self::Unbounded => Deadline::Never,
            Self::Bounded(duration) => Deadline::At(Instant::now() + duration),
        }
    }
}

/// An absolute deadline, derived from a [`Timeout`] at the call site of
/// `wait`.
#[derive(Debug, Clone, Copy)]
pub enum Deadline {
    /// The deadline has already elapsed; any wait returns immediately.
    Elapsed,

    /// There is no deadline; wait indefinitely.
    Never,

    /// Wait until the given instant.
    At(Instant),
}

impl Deadline {
    /// Returns the remaining duration until this deadline, or `None` if it
    /// has already elapsed. [`Deadline::Never`] never elapses, so it has no
    /// finite remaining duration; callers should special-case it before
    /// calling this.
    #[must_use]
    pub fn remaining(self) -> Option<Duration> {
        match self {
            Self::Elapsed => None,
            Self::Never => Some(Duration::MAX),
            Self::At(instant) => instant.checked_duration_since(Instant::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_is_already_elapsed() {
        assert!(matches!(Timeout::Immediate.into_deadline(), Deadline::Elapsed));
    }

    #[test]
    fn unbounded_never_elapses() {
        assert!(matches!(Timeout::Unbounded.into_deadline(), Deadline::Never));
    }

    #[test]
    fn bounded_has_remaining_time() {
        let deadline = Timeout::Bounded(Duration::from_secs(60)).into_deadline();
        assert!(deadline.remaining().is_some_and(|d| d > Duration::from_secs(1)));
    }
}
