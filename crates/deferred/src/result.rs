// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Extensions over the ordinary [`std::result::Result`], used as this
//! crate's tagged value-or-error sum type rather than inventing a new one.

use crate::error::Error;

/// The value-or-error outcome of a fallible operation.
///
/// This crate does not define its own sum type for this: `std::result::Result<V, Error>`
/// already is the tagged union `spec.md` describes, so [`ResultExt`] only
/// adds the combinators that type is missing out of the box.
pub type Result<V> = std::result::Result<V, Error>;

/// Combinators over [`Result`] beyond what `std::result::Result` already
/// provides via `map`/`map_err`/`and_then`.
pub trait ResultExt<V> {
    /// Like `and_then`, but named to match this crate's other `flat_map`
    /// conventions (`Task::and_then`, `Future::and_then`).
    fn flat_map<R>(self, f: impl FnOnce(V) -> Result<R>) -> Result<R>;

    /// Transforms the error variant, leaving a success untouched.
    fn map_error(self, f: impl FnOnce(Error) -> Error) -> Result<V>;

    /// Transforms the error variant into a new `Result`, allowing recovery.
    fn flat_map_error(self, f: impl FnOnce(Error) -> Result<V>) -> Result<V>;

    /// Returns the value, re-raising the error as a panic if there isn't
    /// one.
    ///
    /// # Panics
    ///
    /// Panics, with the error's `Display` message, if `self` is `Err`.
    fn get(self) -> V;
}

impl<V> ResultExt<V> for Result<V> {
    fn flat_map<R>(self, f: impl FnOnce(V) -> Result<R>) -> Result<R> {
        self.and_then(f)
    }

    fn map_error(self, f: impl FnOnce(Error) -> Error) -> Result<V> {
        self.map_err(f)
    }

    fn flat_map_error(self, f: impl FnOnce(Error) -> Result<V>) -> Result<V> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => f(error),
        }
    }

    fn get(self) -> V {
        match self {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }
}

/// A throwing-init convenience constructor: runs `body`, capturing a panic
/// as a [`Error::Programming`] rather than unwinding past this boundary.
///
/// Mirrors the completion-handler style common at FFI and test boundaries,
/// where a block of fallible code needs to be run as a single expression.
///
/// # Panics
///
/// Re-panics if `body` panics with a payload that cannot be downcast to
/// `String` or `&str`.
pub fn try_result<V>(body: impl FnOnce() -> Result<V> + std::panic::UnwindSafe) -> Result<V> {
    match std::panic::catch_unwind(body) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panicked with a non-string payload".to_owned());
            Err(Error::Programming(message))
        }
    }
}

/// Builds a `Result` from the two independent outputs of a
/// completion-handler-style callback (`(value, error)`), where the caller
/// does not statically guarantee exactly one of the two is present.
///
/// Returns `Err(Error::InvalidInput)` when neither is present. If both are
/// present, the value takes precedence.
pub fn from_parts<V>(value: Option<V>, error: Option<Error>) -> Result<V> {
    match (value, error) {
        (Some(value), _) => Ok(value),
        (None, Some(error)) => Err(error),
        (None, None) => Err(Error::InvalidInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_map_chains_success() {
        let result: Result<i32> = Ok(1).flat_map(|v| Ok(v + 1));
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn map_error_transforms_only_errors() {
        let ok: Result<i32> = Ok(1);
        assert_eq!(ok.map_error(|_| Error::InvalidInput).unwrap(), 1);

        let err: Result<i32> = Err(Error::InvalidInput);
        assert!(matches!(
            err.map_error(|_| Error::Cancelled).unwrap_err(),
            Error::Cancelled
        ));
    }

    #[test]
    fn flat_map_error_allows_recovery() {
        let err: Result<i32> = Err(Error::InvalidInput);
        assert_eq!(err.flat_map_error(|_| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn get_returns_the_value_on_success() {
        let ok: Result<i32> = Ok(5);
        assert_eq!(ok.get(), 5);
    }

    #[test]
    #[should_panic(expected = "the task was cancelled before it started")]
    fn get_panics_with_the_error_message_on_failure() {
        let err: Result<i32> = Err(Error::Cancelled);
        let _ = err.get();
    }

    #[test]
    fn try_result_captures_panics_as_programming_errors() {
        let result: Result<i32> = try_result(|| panic!("boom"));
        assert!(matches!(result.unwrap_err(), Error::Programming(message) if message == "boom"));
    }

    #[test]
    fn from_parts_prefers_value_over_error() {
        assert_eq!(from_parts(Some(1), Some(Error::Cancelled)).unwrap(), 1);
    }

    #[test]
    fn from_parts_with_neither_is_invalid_input() {
        let result: Result<i32> = from_parts(None, None);
        assert!(matches!(result.unwrap_err(), Error::InvalidInput));
    }
}
