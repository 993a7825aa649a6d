// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use async_channel::Sender;
use tracing::trace;

use super::Executor;

/// An adapter that submits jobs onto a caller-supplied `async_channel`
/// queue, rather than owning a worker thread itself.
///
/// Cloning a `QueueExecutor` shares the same underlying queue, so multiple
/// `Future`/`Task` chains can be wired to feed the same drain loop (for
/// example, one owned by a [`SerialExecutor`][super::SerialExecutor], or one
/// driven by an embedding application's own event loop).
#[derive(Debug, Clone)]
pub struct QueueExecutor {
    sender: Sender<Box<dyn FnOnce() + Send>>,
}

impl QueueExecutor {
    /// Wraps an existing sender half of a job queue.
    #[must_use]
    pub const fn new(sender: Sender<Box<dyn FnOnce() + Send>>) -> Self {
        Self { sender }
    }
}

impl Executor for QueueExecutor {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        trace!("submitting job onto queue");
        // The receiver half is expected to outlive every sender in normal
        // operation (see `SerialExecutor`'s drain loop). A job submitted
        // after the receiver was dropped is simply discarded: the executor
        // contract only promises eventual execution while the queue is
        // alive, mirroring how a dropped `Deferred` abandons its callbacks.
        drop(self.sender.send_blocking(job));
    }
}
