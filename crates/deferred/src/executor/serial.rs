// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::thread::JoinHandle;

use tracing::trace;

use super::{Executor, QueueExecutor};

/// A FIFO executor backed by a single dedicated worker thread.
///
/// Submissions are queued onto an unbounded `async_channel` and drained in
/// order by the worker thread, so two jobs submitted from the same caller
/// thread run in submission order; `submit` itself never blocks the caller.
#[derive(Debug)]
pub struct SerialExecutor {
    queue: QueueExecutor,
    sender: async_channel::Sender<Box<dyn FnOnce() + Send>>,
    worker: Option<JoinHandle<()>>,
}

impl SerialExecutor {
    /// Spawns the worker thread and returns a handle to its queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::unbounded::<Box<dyn FnOnce() + Send>>();

        let worker = std::thread::Builder::new()
            .name("deferred-serial-executor".to_owned())
            .spawn(move || {
                while let Ok(job) = receiver.recv_blocking() {
                    trace!("running job on serial executor");
                    job();
                }
            })
            .expect("failed to spawn serial executor worker thread");

        Self {
            queue: QueueExecutor::new(sender.clone()),
            sender,
            worker: Some(worker),
        }
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for SerialExecutor {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        self.queue.submit(job);
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        self.sender.close();
        if let Some(worker) = self.worker.take() {
            drop(worker.join());
        }
    }
}
