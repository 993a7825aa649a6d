// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use tracing::trace;

use super::Executor;

/// Runs every submitted job synchronously, on the caller's own thread,
/// before `submit` returns.
///
/// This is the one executor explicitly documented as immediate (see
/// [`Executor::submit`]); useful for tests and for combinators whose
/// transform is cheap enough that scheduling overhead would dominate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateExecutor;

impl Executor for ImmediateExecutor {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        trace!("running job immediately on the submitting thread");
        job();
    }
}
