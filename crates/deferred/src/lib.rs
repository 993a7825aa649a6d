// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A write-once asynchronous value cell ([`Deferred`]), its read-only and
//! write-only views ([`Future`] and [`Promise`]), a cancellation-aware unit
//! of fallible work built on top of it ([`Task`]), and the small set of
//! supporting primitives (an [`Executor`] abstraction, a [`Locking`]
//! abstraction behind [`Protected`], and [`Timeout`]) they are built from.

mod any_future;
mod atomic;
mod combinators;
mod deferred;
pub mod error;
pub mod executor;
mod future;
pub mod locking;
mod promise;
mod protected;
pub mod result;
mod task;
mod timeout;

pub use any_future::AnyFuture;
pub use combinators::Every;
pub use deferred::Deferred;
pub use error::Error;
pub use executor::Executor;
pub use future::Future;
pub use locking::{ExclusiveLock, Locking, ReaderWriterLock};
pub use promise::Promise;
pub use protected::Protected;
pub use result::{ResultExt, from_parts, try_result};
pub use task::{Cancellation, Task};
pub use timeout::{Deadline, Timeout};
