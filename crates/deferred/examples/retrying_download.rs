// Copyright (c) Microsoft Corporation.

//! This example demonstrates spawning cancellable work and retrying it with
//! `Task::repeat`, the way a caller might wrap a flaky network call.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use deferred::executor::SerialExecutor;
use deferred::{Error, Executor, Task, Timeout};

fn main() {
    let executor: Arc<dyn Executor> = Arc::new(SerialExecutor::new());
    let attempt = Arc::new(AtomicUsize::new(0));

    // Pretend the first two attempts fail, the third succeeds.
    let download = {
        let executor = Arc::clone(&executor);
        let attempt = Arc::clone(&attempt);
        move || {
            let attempt = Arc::clone(&attempt);
            Task::spawn(
                Arc::clone(&executor),
                || println!("download cancelled before it started"),
                move || {
                    let n = attempt.fetch_add(1, Ordering::AcqRel) + 1;
                    if n < 3 {
                        println!("attempt {n} failed");
                        Err(Error::Cancelled)
                    } else {
                        println!("attempt {n} succeeded");
                        Ok(format!("payload from attempt {n}"))
                    }
                },
            )
        }
    };

    let task = Task::repeat(executor, 5, |_error| true, download);

    match task.wait(Timeout::Unbounded) {
        Some(Ok(payload)) => println!("final result: {payload}"),
        Some(Err(error)) => println!("gave up: {error}"),
        None => println!("task was abandoned"),
    }
}
