// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// An error originating in the `deferred` crate.
///
/// This is an umbrella type covering both programmer errors (e.g. calling
/// [`Promise::must_fill`][crate::Promise::must_fill] twice) and the
/// distinguished failures produced by the `Task` algebra (cancellation, and
/// the completion-handler convenience constructor's "neither value nor
/// error" case). Future versions may add additional variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller made a mistake (e.g. filled an already-filled `Deferred`
    /// through the strict `must_fill` entry point, or called an operation
    /// out of sequence).
    #[error("{0}")]
    Programming(String),

    /// A [`Task`][crate::Task] was cancelled before its work began.
    #[error("the task was cancelled before it started")]
    Cancelled,

    /// The completion-handler-style constructor
    /// ([`from_parts`][crate::from_parts]) was given neither a value nor an
    /// error.
    #[error("completion handler produced neither a value nor an error")]
    InvalidInput,
}
